use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use ratatui::style::Style;
use sql_chat_theme as theme;
use tui_textarea::TextArea;

use super::Chat;
use crate::{action::Action, components::ComponentKind, config::Config, conversation::Conversation};

const SCROLL_STEP: u16 = 5;
const FLASH_TTL: Duration = Duration::from_secs(3);

pub(super) fn new_input() -> TextArea<'static> {
  let mut input = TextArea::default();
  input.set_cursor_line_style(Style::default());
  input.set_style(theme::input());
  input.set_placeholder_text("Ask a question about your database");
  input.set_placeholder_style(theme::muted());
  input
}

impl Chat {
  pub fn new() -> Self {
    Self {
      command_tx: None,
      config: Config::default(),
      messages: Conversation::new().messages().to_vec(),
      scroll_back: 0,
      input: new_input(),
      focused: true,
      is_busy: false,
      turn_started: None,
      last_report: None,
      is_connected: false,
      show_details: false,
      show_help: false,
      flash: None,
    }
  }

  pub fn input_text(&self) -> String {
    self.input.lines().join("\n")
  }

  pub(super) fn set_flash(&mut self, message: impl Into<String>) {
    self.flash = Some((message.into(), Instant::now()));
  }

  fn set_focus(&mut self, focused: bool) {
    self.focused = focused;
    if !focused {
      self.show_details = false;
      self.show_help = false;
    }
  }

  pub(super) fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::Tick => {
        if self.flash.as_ref().is_some_and(|(_, at)| at.elapsed() >= FLASH_TTL) {
          self.flash = None;
        }
      },
      Action::FocusChat => self.set_focus(true),
      Action::FocusSettings => self.set_focus(false),
      Action::SelectComponent(kind) => self.set_focus(kind == ComponentKind::Chat),
      Action::Connected(_) => self.is_connected = true,
      Action::ConversationUpdated(messages) => {
        self.messages = messages;
        self.scroll_back = 0;
      },
      Action::TurnStarted => {
        self.is_busy = true;
        self.turn_started = Some(Instant::now());
      },
      Action::TurnCompleted(report) => {
        self.is_busy = false;
        self.turn_started = None;
        self.last_report = report;
      },
      Action::ScrollUp => self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP),
      Action::ScrollDown => self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP),
      Action::ToggleQueryDetails => {
        if self.last_report.is_some() {
          self.show_details = !self.show_details;
          self.show_help = false;
        } else {
          self.set_flash("No query has run yet");
        }
      },
      Action::Help => {
        self.show_help = !self.show_help;
        self.show_details = false;
      },
      Action::Notify(message) => self.set_flash(message),
      _ => {},
    }
    Ok(None)
  }
}
