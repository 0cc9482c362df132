pub mod chat;
pub mod settings;

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

pub use crate::tui::Frame;
use crate::{action::Action, config::Config, mode::Mode, tui};

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
  Settings,
  #[default]
  Chat,
}

impl ComponentKind {
  pub fn mode(&self) -> Mode {
    match self {
      Self::Settings => Mode::Settings,
      Self::Chat => Mode::Chat,
    }
  }
}

pub trait Component {
  fn kind(&self) -> ComponentKind;
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()>;
  fn register_config_handler(&mut self, config: Config) -> Result<()>;
  fn update(&mut self, action: Action) -> Result<Option<Action>>;
  fn handle_events(&mut self, event: Option<tui::Event>) -> Result<Option<Action>>;
  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>>;
  fn init(&mut self, area: Rect) -> Result<()>;
  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;
}

/// Screen split shared by the app and the component tests: a title row, the
/// connection form on the left and the chat on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
  pub title: Rect,
  pub settings: Rect,
  pub chat: Rect,
}

impl AppLayout {
  pub fn new(area: Rect) -> Self {
    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(3), Constraint::Min(1)])
      .split(area);
    let panes = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Length(36), Constraint::Min(20)])
      .split(rows[1]);

    Self { title: rows[0], settings: panes[0], chat: panes[1] }
  }

  pub fn area_for(&self, kind: ComponentKind) -> Rect {
    match kind {
      ComponentKind::Settings => self.settings,
      ComponentKind::Chat => self.chat,
    }
  }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
  let popup_layout = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - percent_y) / 2),
      Constraint::Percentage(percent_y),
      Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - percent_x) / 2),
      Constraint::Percentage(percent_x),
      Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
