use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{backend::TestBackend, layout::Rect, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use sql_chat::{action::Action, components::Component, config::Config, tui::Event};

use super::{TEST_TERMINAL_HEIGHT, TEST_TERMINAL_WIDTH};

pub struct ComponentTestHarness<C: Component> {
    pub component: C,
    pub terminal: Terminal<TestBackend>,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
}

impl<C: Component> ComponentTestHarness<C> {
    pub fn new(mut component: C) -> Result<Self> {
        let terminal = Terminal::new(TestBackend::new(TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT))?;
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        component.register_action_handler(action_tx.clone())?;

        let area = Rect::new(0, 0, TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT);
        component.init(area)?;

        Ok(Self { component, terminal, action_tx, action_rx })
    }

    pub fn with_config(mut self, config: Config) -> Result<Self> {
        self.component.register_config_handler(config)?;
        Ok(self)
    }

    /// Draws the component over the whole test terminal and returns the rows.
    pub fn render(&mut self) -> Result<Vec<String>> {
        let mut result = Ok(());
        self.terminal.draw(|f| {
            result = self.component.draw(f, f.area());
        })?;
        result?;
        Ok(self.get_buffer_content())
    }

    pub fn send_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        self.component.handle_key_events(key)
    }

    /// Feeds the keys one by one, collecting every action they produce.
    pub fn send_keys(&mut self, keys: Vec<KeyEvent>) -> Result<Vec<Action>> {
        let mut actions = Vec::new();
        for key in keys {
            if let Some(action) = self.send_key_event(key)? {
                actions.push(action);
            }
        }
        Ok(actions)
    }

    pub fn send_event(&mut self, event: Event) -> Result<Option<Action>> {
        self.component.handle_events(Some(event))
    }

    pub fn update(&mut self, action: Action) -> Result<Option<Action>> {
        self.component.update(action)
    }

    pub fn collect_actions(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.action_rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    pub fn get_buffer_content(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        lines
    }
}
