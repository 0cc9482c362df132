use std::{collections::HashMap, path::PathBuf};

use color_eyre::eyre::{self, Result, WrapErr};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{de::Deserializer, Deserialize};

use crate::{action::Action, llm::LlmConfig, mode::Mode, prompt::PromptConfig, sql::ConnectionDescriptor};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub _data_dir: PathBuf,
  #[serde(default)]
  pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
  #[serde(default, flatten)]
  pub config: AppConfig,
  #[serde(default)]
  pub keybindings: KeyBindings,
  #[serde(default)]
  pub llm: LlmConfig,
  #[serde(default)]
  pub connection: ConnectionDescriptor,
  #[serde(default)]
  pub prompts: PromptConfig,
}

impl Config {
  /// Built-in defaults overlaid with whatever the user keeps in the config directory.
  pub fn new() -> Result<Self> {
    Self::load_from(&crate::utils::get_config_dir())
  }

  pub fn load_from(config_dir: &std::path::Path) -> Result<Self> {
    let default_config = Self::defaults()?;
    let data_dir = crate::utils::get_data_dir();

    let mut builder = config::Config::builder()
      .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
      .set_default("_config_dir", config_dir.to_string_lossy().to_string())?
      .set_default("llm.base_url", default_config.llm.base_url.clone())?
      .set_default("llm.model", default_config.llm.model.clone())?
      .set_default("llm.temperature", f64::from(default_config.llm.temperature))?
      .set_default("llm.api_key_env", default_config.llm.api_key_env.clone())?
      .set_default("connection.backend", default_config.connection.backend.to_string())?
      .set_default("connection.host", default_config.connection.host.clone())?
      .set_default("connection.port", i64::from(default_config.connection.port))?
      .set_default("connection.username", default_config.connection.username.clone())?
      .set_default("connection.password", default_config.connection.password.clone())?
      .set_default("connection.database", default_config.connection.database.clone())?;

    let config_files = [
      ("config.json5", config::FileFormat::Json5),
      ("config.json", config::FileFormat::Json),
      ("config.yaml", config::FileFormat::Yaml),
      ("config.toml", config::FileFormat::Toml),
      ("config.ini", config::FileFormat::Ini),
    ];
    let mut found_config = false;
    for (file, format) in &config_files {
      builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
      if config_dir.join(file).exists() {
        found_config = true
      }
    }
    if !found_config {
      log::info!("No configuration file in {}, using built-in defaults", config_dir.display());
    }

    let mut cfg: Self =
      builder.build()?.try_deserialize().wrap_err_with(|| format!("invalid config in {}", config_dir.display()))?;

    for (mode, default_bindings) in default_config.keybindings.iter() {
      let user_bindings = cfg.keybindings.entry(*mode).or_default();
      for (key, cmd) in default_bindings.iter() {
        user_bindings.entry(key.clone()).or_insert_with(|| cmd.clone());
      }
    }

    Ok(cfg)
  }

  /// The embedded defaults alone.
  pub fn defaults() -> Result<Self> {
    json5::from_str(CONFIG).wrap_err("built-in config is invalid")
  }
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct KeyBindings(pub HashMap<Mode, HashMap<Vec<KeyEvent>, Action>>);

impl<'de> Deserialize<'de> for KeyBindings {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let parsed_map = HashMap::<Mode, HashMap<String, Action>>::deserialize(deserializer)?;

    let mut keybindings = HashMap::new();
    for (mode, inner_map) in parsed_map {
      let mut bindings = HashMap::new();
      for (key_str, cmd) in inner_map {
        let keys = parse_key_sequence(&key_str).map_err(serde::de::Error::custom)?;
        bindings.insert(keys, cmd);
      }
      keybindings.insert(mode, bindings);
    }

    Ok(KeyBindings(keybindings))
  }
}

fn parse_key_event(raw: &str) -> Result<KeyEvent> {
  let raw_lower = raw.to_ascii_lowercase();
  let (remaining, modifiers) = extract_modifiers(&raw_lower);
  parse_key_code_with_modifiers(remaining, modifiers)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
  let mut modifiers = KeyModifiers::empty();
  let mut current = raw;

  loop {
    match current {
      rest if rest.starts_with("ctrl-") => {
        modifiers.insert(KeyModifiers::CONTROL);
        current = &rest[5..];
      },
      rest if rest.starts_with("alt-") => {
        modifiers.insert(KeyModifiers::ALT);
        current = &rest[4..];
      },
      rest if rest.starts_with("shift-") => {
        modifiers.insert(KeyModifiers::SHIFT);
        current = &rest[6..];
      },
      _ => break,
    };
  }

  (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, mut modifiers: KeyModifiers) -> Result<KeyEvent> {
  let c = match raw {
    "esc" => KeyCode::Esc,
    "enter" => KeyCode::Enter,
    "left" => KeyCode::Left,
    "right" => KeyCode::Right,
    "up" => KeyCode::Up,
    "down" => KeyCode::Down,
    "home" => KeyCode::Home,
    "end" => KeyCode::End,
    "pageup" => KeyCode::PageUp,
    "pagedown" => KeyCode::PageDown,
    "backtab" => {
      modifiers.insert(KeyModifiers::SHIFT);
      KeyCode::BackTab
    },
    "backspace" => KeyCode::Backspace,
    "delete" => KeyCode::Delete,
    "insert" => KeyCode::Insert,
    "f1" => KeyCode::F(1),
    "f2" => KeyCode::F(2),
    "f3" => KeyCode::F(3),
    "f4" => KeyCode::F(4),
    "f5" => KeyCode::F(5),
    "f6" => KeyCode::F(6),
    "f7" => KeyCode::F(7),
    "f8" => KeyCode::F(8),
    "f9" => KeyCode::F(9),
    "f10" => KeyCode::F(10),
    "f11" => KeyCode::F(11),
    "f12" => KeyCode::F(12),
    "space" => KeyCode::Char(' '),
    "hyphen" | "minus" => KeyCode::Char('-'),
    "tab" => KeyCode::Tab,
    c if c.chars().count() == 1 => {
      let mut c = c.chars().next().unwrap_or_default();
      if modifiers.contains(KeyModifiers::SHIFT) {
        c = c.to_ascii_uppercase();
      }
      KeyCode::Char(c)
    },
    _ => eyre::bail!("Unable to parse {raw}"),
  };
  Ok(KeyEvent::new(c, modifiers))
}

pub fn key_event_to_string(key_event: &KeyEvent) -> String {
  let char;
  let key_code = match key_event.code {
    KeyCode::Backspace => "backspace",
    KeyCode::Enter => "enter",
    KeyCode::Left => "left",
    KeyCode::Right => "right",
    KeyCode::Up => "up",
    KeyCode::Down => "down",
    KeyCode::Home => "home",
    KeyCode::End => "end",
    KeyCode::PageUp => "pageup",
    KeyCode::PageDown => "pagedown",
    KeyCode::Tab => "tab",
    KeyCode::BackTab => "backtab",
    KeyCode::Delete => "delete",
    KeyCode::Insert => "insert",
    KeyCode::F(c) => {
      char = format!("f({c})");
      &char
    },
    KeyCode::Char(' ') => "space",
    KeyCode::Char(c) => {
      char = c.to_string();
      &char
    },
    KeyCode::Esc => "esc",
    _ => "",
  };

  let mut modifiers = Vec::with_capacity(3);
  if key_event.modifiers.intersects(KeyModifiers::CONTROL) {
    modifiers.push("ctrl");
  }
  if key_event.modifiers.intersects(KeyModifiers::SHIFT) {
    modifiers.push("shift");
  }
  if key_event.modifiers.intersects(KeyModifiers::ALT) {
    modifiers.push("alt");
  }

  let mut key = modifiers.join("-");
  if !key.is_empty() {
    key.push('-');
  }
  key.push_str(key_code);

  key
}

pub fn parse_key_sequence(raw: &str) -> Result<Vec<KeyEvent>> {
  if raw.chars().filter(|c| *c == '>').count() != raw.chars().filter(|c| *c == '<').count() {
    eyre::bail!("Unable to parse `{raw}`");
  }
  let raw = if !raw.contains("><") {
    let raw = raw.strip_prefix('<').unwrap_or(raw);
    raw.strip_suffix('>').unwrap_or(raw)
  } else {
    raw
  };
  raw
    .split("><")
    .map(|seq| {
      let seq = seq.strip_prefix('<').unwrap_or(seq);
      seq.strip_suffix('>').unwrap_or(seq)
    })
    .map(parse_key_event)
    .collect()
}
