use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::*, widgets::*};
use sql_chat_theme as theme;
use strum::Display;
use tokio::sync::mpsc::UnboundedSender;

use super::{Component, ComponentKind, Frame};
use crate::{
  action::Action,
  config::Config,
  sql::{Backend, ConnectionDescriptor},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FormField {
  Backend,
  Host,
  Port,
  #[strum(serialize = "UserName")]
  Username,
  Password,
  Database,
}

const NETWORK_FIELDS: [FormField; 6] = [
  FormField::Backend,
  FormField::Host,
  FormField::Port,
  FormField::Username,
  FormField::Password,
  FormField::Database,
];

const FILE_FIELDS: [FormField; 2] = [FormField::Backend, FormField::Database];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
  #[default]
  Disconnected,
  Connecting,
  Connected(String),
  Failed(String),
}

/// Connection form. Values are kept as typed and only turned into a
/// descriptor on submit.
#[derive(Default)]
pub struct Settings {
  command_tx: Option<UnboundedSender<Action>>,
  config: Config,
  pub backend: Backend,
  pub host: String,
  pub port: String,
  pub username: String,
  pub password: String,
  pub database: String,
  pub selected: usize,
  pub focused: bool,
  pub status: ConnectionStatus,
}

impl Settings {
  pub fn new(form: &ConnectionDescriptor) -> Self {
    let mut settings = Self::default();
    settings.fill(form);
    settings
  }

  pub fn fill(&mut self, form: &ConnectionDescriptor) {
    self.backend = form.backend;
    self.host = form.host.clone();
    self.port = form.port.to_string();
    self.username = form.username.clone();
    self.password = form.password.clone();
    self.database = form.database.clone();
    self.selected = 0;
  }

  pub fn fields(&self) -> &'static [FormField] {
    match self.backend {
      Backend::Sqlite => &FILE_FIELDS,
      _ => &NETWORK_FIELDS,
    }
  }

  pub fn selected_field(&self) -> FormField {
    let fields = self.fields();
    fields[self.selected.min(fields.len() - 1)]
  }

  pub fn descriptor(&self) -> std::result::Result<ConnectionDescriptor, String> {
    if self.backend == Backend::Sqlite {
      if self.database.trim().is_empty() {
        return Err("Database file is required".to_string());
      }
      return Ok(ConnectionDescriptor::sqlite(self.database.trim()));
    }

    let port = self.port.trim().parse::<u16>().map_err(|_| format!("Invalid port '{}'", self.port))?;
    Ok(ConnectionDescriptor {
      backend: self.backend,
      host: self.host.trim().to_string(),
      port,
      username: self.username.trim().to_string(),
      password: self.password.clone(),
      database: self.database.trim().to_string(),
    })
  }

  fn value_mut(&mut self, field: FormField) -> Option<&mut String> {
    match field {
      FormField::Backend => None,
      FormField::Host => Some(&mut self.host),
      FormField::Port => Some(&mut self.port),
      FormField::Username => Some(&mut self.username),
      FormField::Password => Some(&mut self.password),
      FormField::Database => Some(&mut self.database),
    }
  }

  fn display_value(&self, field: FormField) -> String {
    match field {
      FormField::Backend => format!("< {} >", self.backend),
      FormField::Host => self.host.clone(),
      FormField::Port => self.port.clone(),
      FormField::Username => self.username.clone(),
      FormField::Password => "*".repeat(self.password.chars().count()),
      FormField::Database => self.database.clone(),
    }
  }

  fn label(&self, field: FormField) -> String {
    match (field, self.backend) {
      (FormField::Database, Backend::Sqlite) => "File".to_string(),
      (field, _) => field.to_string(),
    }
  }

  fn set_backend(&mut self, backend: Backend) {
    // keep a hand-typed port, follow the backend otherwise
    if self.port == self.backend.default_port().to_string() || self.port.is_empty() {
      self.port = backend.default_port().to_string();
    }
    self.backend = backend;
    self.selected = self.selected.min(self.fields().len() - 1);
  }

  fn next_field(&mut self) {
    self.selected = (self.selected + 1) % self.fields().len();
  }

  fn prev_field(&mut self) {
    let len = self.fields().len();
    self.selected = (self.selected + len - 1) % len;
  }

  fn submit(&mut self) -> Option<Action> {
    match self.descriptor() {
      Ok(descriptor) => {
        self.status = ConnectionStatus::Connecting;
        Some(Action::Connect(descriptor))
      },
      Err(e) => {
        self.status = ConnectionStatus::Failed(e);
        None
      },
    }
  }
}

impl Component for Settings {
  fn kind(&self) -> ComponentKind {
    ComponentKind::Settings
  }

  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.config = config;
    Ok(())
  }

  fn init(&mut self, _area: Rect) -> Result<()> {
    Ok(())
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::FocusSettings => self.focused = true,
      Action::FocusChat => self.focused = false,
      Action::SelectComponent(kind) => self.focused = kind == ComponentKind::Settings,
      Action::NextField if self.focused => self.next_field(),
      Action::PrevField if self.focused => self.prev_field(),
      Action::SubmitConnection if self.focused => return Ok(self.submit()),
      Action::Connected(target) => self.status = ConnectionStatus::Connected(target),
      Action::ConnectionFailed(e) => self.status = ConnectionStatus::Failed(e),
      _ => {},
    }
    Ok(None)
  }

  fn handle_events(&mut self, event: Option<crate::tui::Event>) -> Result<Option<Action>> {
    match event {
      Some(crate::tui::Event::Key(key)) => self.handle_key_events(key),
      Some(crate::tui::Event::Paste(text)) => {
        if let Some(value) = self.value_mut(self.selected_field()) {
          value.push_str(text.trim_end_matches(&['\r', '\n'][..]));
        }
        Ok(Some(Action::Render))
      },
      _ => Ok(None),
    }
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    let field = self.selected_field();
    match key.code {
      KeyCode::Left if field == FormField::Backend => self.set_backend(self.backend.previous()),
      KeyCode::Right | KeyCode::Char(' ') if field == FormField::Backend => self.set_backend(self.backend.next()),
      KeyCode::Backspace => {
        if let Some(value) = self.value_mut(field) {
          value.pop();
        }
      },
      KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
        if field == FormField::Port && !c.is_ascii_digit() {
          return Ok(None);
        }
        if let Some(value) = self.value_mut(field) {
          value.push(c);
        }
      },
      _ => return Ok(None),
    }
    Ok(Some(Action::Render))
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(if self.focused { theme::border_focused() } else { theme::border_normal() })
      .border_type(BorderType::Rounded)
      .title("Connection [Esc]")
      .title_style(theme::title())
      .style(theme::bg_primary());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(self.fields().len() as u16 * 2), Constraint::Min(1)])
      .split(inner);

    let selected = self.selected_field();
    let mut lines = Vec::new();
    let mut cursor = None;
    for (i, field) in self.fields().iter().enumerate() {
      let is_selected = self.focused && *field == selected;
      let value = self.display_value(*field);
      lines.push(Line::from(Span::styled(self.label(*field), theme::muted())));
      let value_style = if is_selected { theme::selection_active() } else { theme::input() };
      lines.push(Line::from(Span::styled(format!(" {value}"), value_style)));
      if is_selected && *field != FormField::Backend {
        let x = chunks[0].x.saturating_add(1 + value.chars().count() as u16);
        let y = chunks[0].y.saturating_add(i as u16 * 2 + 1);
        cursor = Some((x.min(chunks[0].right().saturating_sub(1)), y));
      }
    }
    f.render_widget(Paragraph::new(lines), chunks[0]);
    if let Some(position) = cursor {
      f.set_cursor_position(position);
    }

    let status = match &self.status {
      ConnectionStatus::Disconnected => Line::from(Span::styled("Not connected. [Enter] Connect", theme::muted())),
      ConnectionStatus::Connecting => Line::from(Span::styled("Connecting...", theme::warning())),
      ConnectionStatus::Connected(target) => Line::from(Span::styled(format!("Connected to {target}"), theme::success())),
      ConnectionStatus::Failed(e) => Line::from(Span::styled(e.clone(), theme::error())),
    };
    let status = Paragraph::new(vec![Line::from(""), status]).wrap(Wrap { trim: true });
    f.render_widget(status, chunks[1]);

    Ok(())
  }
}
