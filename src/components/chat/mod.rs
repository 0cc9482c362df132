pub mod handlers;
pub mod rendering;
pub mod state;

use std::time::Instant;

use color_eyre::eyre::Result;
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use tui_textarea::TextArea;

use super::{Component, ComponentKind, Frame};
use crate::{action::Action, config::Config, conversation::Message, pipeline::TurnReport};

/// The conversation pane: transcript, question input and the popups that
/// hang off the last turn.
pub struct Chat {
  pub command_tx: Option<UnboundedSender<Action>>,
  pub config: Config,

  // Transcript
  pub messages: Vec<Message>,
  pub scroll_back: u16,

  // Input
  pub input: TextArea<'static>,
  pub focused: bool,

  // Turn state
  pub is_busy: bool,
  pub turn_started: Option<Instant>,
  pub last_report: Option<TurnReport>,
  pub is_connected: bool,

  // Popups and notices
  pub show_details: bool,
  pub show_help: bool,
  pub flash: Option<(String, Instant)>,
}

impl Default for Chat {
  fn default() -> Self {
    Self::new()
  }
}

impl Component for Chat {
  fn kind(&self) -> ComponentKind {
    ComponentKind::Chat
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

  fn handle_events(&mut self, event: Option<crate::tui::Event>) -> Result<Option<Action>> {
    self.handle_events(event)
  }

  fn handle_key_events(&mut self, key: crossterm::event::KeyEvent) -> Result<Option<Action>> {
    self.handle_key_events(key)
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    self.update(action)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    self.draw(f, area)
  }
}
