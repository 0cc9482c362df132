use std::sync::Arc;

use arboard::Clipboard;
use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{prelude::*, widgets::*};
use sql_chat_theme as theme;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
  action::Action,
  cli::Cli,
  components::{chat::Chat, settings::Settings, AppLayout, Component, ComponentKind, Frame},
  config::Config,
  conversation::Role,
  llm::{ChatModel, OpenAiCompatible},
  mode::Mode,
  pipeline::Pipeline,
  prompt::Prompts,
  session::Session,
  sql::ConnectionDescriptor,
  tui,
};

pub struct App {
  pub config: Config,
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub components: Vec<Box<dyn Component>>,
  pub should_quit: bool,
  pub should_suspend: bool,
  pub mode: Mode,
  pub last_tick_key_events: Vec<KeyEvent>,
  pub auto_connect: bool,
  session: Session,
  clipboard: Option<Clipboard>,
}

impl App {
  pub fn new(cli_args: &Cli) -> Result<Self> {
    let config = Config::new()?;
    let model = OpenAiCompatible::new(&config.llm)?;
    let form = cli_args.connection_form(&config.connection);

    let mut app = Self::with_model(config, Arc::new(model), &form)?;
    app.tick_rate = cli_args.tick_rate;
    app.frame_rate = cli_args.frame_rate;
    app.auto_connect = cli_args.is_sqlite_mode() || cli_args.password_prompt;
    Ok(app)
  }

  pub fn with_model(config: Config, model: Arc<dyn ChatModel>, form: &ConnectionDescriptor) -> Result<Self> {
    let prompts = Prompts::from_config(&config.prompts)?;
    let session = Session::new(Pipeline::new(model, prompts));
    let settings = Settings::new(form);
    let chat = Chat::new();

    Ok(Self {
      config,
      tick_rate: 1.0,
      frame_rate: 4.0,
      // chat last so its popups draw over the form
      components: vec![Box::new(settings), Box::new(chat)],
      should_quit: false,
      should_suspend: false,
      mode: Mode::Settings,
      last_tick_key_events: Vec::new(),
      auto_connect: false,
      session,
      clipboard: None,
    })
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  /// Keymap lookup for the current mode. Unbound keys go to the focused component.
  pub fn action_for_key(&mut self, key: KeyEvent) -> Option<Action> {
    let keymap = self.config.keybindings.get(&self.mode)?;
    if let Some(action) = keymap.get(&vec![key]) {
      return Some(action.clone());
    }

    // If the key was not handled as a single key action,
    // then consider it for multi-key combinations.
    self.last_tick_key_events.push(key);
    keymap.get(&self.last_tick_key_events).cloned()
  }

  pub async fn run(&mut self) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();

    let mut tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
    tui.enter()?;

    for component in self.components.iter_mut() {
      component.register_action_handler(action_tx.clone())?;
    }

    for component in self.components.iter_mut() {
      component.register_config_handler(self.config.clone())?;
    }

    for component in self.components.iter_mut() {
      component.init(Rect::default())?;
    }

    action_tx.send(Action::SelectComponent(ComponentKind::Settings))?;
    if self.auto_connect {
      action_tx.send(Action::SubmitConnection)?;
    }

    loop {
      if let Some(e) = tui.next().await {
        let mut forward = None;
        match e {
          tui::Event::Quit => action_tx.send(Action::Quit)?,
          tui::Event::Tick => action_tx.send(Action::Tick)?,
          tui::Event::Render => action_tx.send(Action::Render)?,
          tui::Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
          tui::Event::Key(key) => {
            if let Some(action) = self.action_for_key(key) {
              log::info!("Got action: {action:?}");
              action_tx.send(action)?;
            } else {
              forward = Some(e);
            }
          },
          tui::Event::Paste(_) => forward = Some(e),
          _ => {},
        }

        if let Some(event) = forward {
          let focused = self.focused_kind();
          for component in self.components.iter_mut().filter(|c| c.kind() == focused) {
            if let Some(action) = component.handle_events(Some(event.clone()))? {
              action_tx.send(action)?;
            }
          }
        }
      }

      while let Ok(action) = action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          log::debug!("{action:?}");
        }
        match action {
          Action::Tick => {
            self.last_tick_key_events.drain(..);
          },
          Action::Quit => self.should_quit = true,
          Action::Suspend => self.should_suspend = true,
          Action::Resume => self.should_suspend = false,
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, w, h))?;
            self.render(&mut tui)?;
          },
          Action::Render => self.render(&mut tui)?,
          Action::FocusSettings => self.mode = Mode::Settings,
          Action::FocusChat => self.mode = Mode::Chat,
          Action::SelectComponent(kind) => self.mode = kind.mode(),
          Action::Connect(ref descriptor) => {
            // show "Connecting..." before blocking on the driver
            self.render(&mut tui)?;
            self.connect(descriptor, &action_tx).await?;
          },
          Action::Ask(ref question) => self.ask(question, &mut tui, &action_tx).await?,
          Action::CopyAnswer => {
            // the greeting alone is not an answer
            let answer = self
              .session
              .conversation()
              .last()
              .filter(|m| m.role == Role::Assistant && self.session.conversation().len() > 1)
              .map(|m| m.content.clone());
            let notice = match answer {
              Some(text) => copy_notice("Answer", self.copy_to_clipboard(text)),
              None => Action::Notify("No answer to copy".to_string()),
            };
            action_tx.send(notice)?;
          },
          Action::CopyQuery => {
            let notice = match self.session.last_report().map(|r| r.sql.clone()) {
              Some(sql) => copy_notice("SQL", self.copy_to_clipboard(sql)),
              None => Action::Notify("No query to copy".to_string()),
            };
            action_tx.send(notice)?;
          },
          Action::Error(ref e) => log::error!("{e}"),
          _ => {},
        }
        self.dispatch(action, &action_tx)?;
      }

      if self.should_suspend {
        tui.suspend()?;
        action_tx.send(Action::Resume)?;
        tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  fn focused_kind(&self) -> ComponentKind {
    match self.mode {
      Mode::Settings => ComponentKind::Settings,
      Mode::Chat => ComponentKind::Chat,
    }
  }

  /// Hands an action to every component and queues whatever they answer with.
  fn dispatch(&mut self, action: Action, tx: &UnboundedSender<Action>) -> Result<()> {
    for component in self.components.iter_mut() {
      if let Some(action) = component.update(action.clone())? {
        tx.send(action)?
      };
    }
    Ok(())
  }

  async fn connect(&mut self, descriptor: &ConnectionDescriptor, tx: &UnboundedSender<Action>) -> Result<()> {
    match self.session.connect(descriptor).await {
      Ok(()) => {
        tx.send(Action::Connected(descriptor.to_string()))?;
        tx.send(Action::FocusChat)?;
      },
      Err(e) => {
        log::warn!("Connection to {descriptor} failed: {e:#}");
        tx.send(Action::ConnectionFailed(format!("{e:#}")))?;
      },
    }
    Ok(())
  }

  /// Runs one turn inline. The user entry and the busy marker are drawn before
  /// the pipeline starts so the wait is visible.
  async fn ask(&mut self, question: &str, tui: &mut tui::Tui, tx: &UnboundedSender<Action>) -> Result<()> {
    if !self.session.begin_turn(question) {
      return Ok(());
    }
    self.dispatch(Action::ConversationUpdated(self.session.conversation().messages().to_vec()), tx)?;
    self.dispatch(Action::TurnStarted, tx)?;
    self.render(tui)?;

    self.session.finish_turn().await;

    tx.send(Action::ConversationUpdated(self.session.conversation().messages().to_vec()))?;
    tx.send(Action::TurnCompleted(self.session.last_report().cloned()))?;
    Ok(())
  }

  fn copy_to_clipboard(&mut self, text: String) -> Result<()> {
    if self.clipboard.is_none() {
      self.clipboard = Some(Clipboard::new()?);
    }
    // the clipboard stays owned by the app so the selection outlives this call
    if let Some(clipboard) = self.clipboard.as_mut() {
      clipboard.set_text(text)?;
    }
    Ok(())
  }

  fn render(&mut self, tui: &mut tui::Tui) -> Result<()> {
    let mut errors = Vec::new();
    tui.draw(|f| {
      let layout = AppLayout::new(f.area());
      draw_title(f, layout.title, self.session.descriptor().filter(|_| self.session.is_connected()));
      for component in self.components.iter_mut() {
        if let Err(e) = component.draw(f, layout.area_for(component.kind())) {
          errors.push(e);
        }
      }
    })?;
    for e in errors {
      log::error!("Failed to draw: {e:?}");
    }
    Ok(())
  }
}

/// The notice for a copy attempt. Success is only claimed when the text
/// actually reached the clipboard.
pub fn copy_notice(what: &str, result: Result<()>) -> Action {
  match result {
    Ok(()) => Action::Notify(format!("{what} copied to clipboard")),
    Err(e) => {
      log::warn!("Failed to copy to clipboard: {e}");
      Action::Notify(format!("Copy failed: {e}"))
    },
  }
}

pub fn draw_title(f: &mut Frame<'_>, area: Rect, connection: Option<&ConnectionDescriptor>) {
  let title_block = Block::default()
    .borders(Borders::ALL)
    .border_style(theme::border_normal())
    .border_type(BorderType::Rounded)
    .style(theme::bg_primary());

  let target = match connection {
    Some(descriptor) => Span::styled(descriptor.to_string(), theme::success()),
    None => Span::styled("not connected", theme::muted()),
  };
  let title = Paragraph::new(Line::from(vec![
    Span::styled("SQL Chat - ", theme::title()),
    target,
    Span::styled("   [Esc] Switch pane  [F1] Help", theme::muted()),
  ]))
  .block(title_block);

  f.render_widget(title, area);
}
