use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use sql_chat::tui::Event;

pub struct EventBuilder {
    events: Vec<KeyEvent>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn push(mut self, code: KeyCode, modifiers: KeyModifiers) -> Self {
        self.events.push(KeyEvent { code, modifiers, kind: KeyEventKind::Press, state: KeyEventState::empty() });
        self
    }

    pub fn key(self, key: char) -> Self {
        self.push(KeyCode::Char(key), KeyModifiers::empty())
    }

    pub fn ctrl(self, key: char) -> Self {
        self.push(KeyCode::Char(key), KeyModifiers::CONTROL)
    }

    pub fn keys(mut self, keys: &str) -> Self {
        for ch in keys.chars() {
            self = self.key(ch);
        }
        self
    }

    pub fn enter(self) -> Self {
        self.push(KeyCode::Enter, KeyModifiers::empty())
    }

    pub fn esc(self) -> Self {
        self.push(KeyCode::Esc, KeyModifiers::empty())
    }

    pub fn left(self) -> Self {
        self.push(KeyCode::Left, KeyModifiers::empty())
    }

    pub fn right(self) -> Self {
        self.push(KeyCode::Right, KeyModifiers::empty())
    }

    pub fn backspace(self) -> Self {
        self.push(KeyCode::Backspace, KeyModifiers::empty())
    }

    pub fn build(self) -> Vec<KeyEvent> {
        self.events
    }

    pub fn paste(text: &str) -> Event {
        Event::Paste(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let events = EventBuilder::new().keys("hello").ctrl('y').enter().build();

        assert_eq!(events.len(), 7); // 5 chars + ctrl+y + enter
        assert_eq!(events[0].code, KeyCode::Char('h'));
        assert_eq!(events[5].modifiers, KeyModifiers::CONTROL);
    }
}
