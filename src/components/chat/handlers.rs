use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{state::new_input, Chat};
use crate::action::Action;

impl Chat {
  pub(super) fn handle_events(&mut self, event: Option<crate::tui::Event>) -> Result<Option<Action>> {
    match event {
      Some(crate::tui::Event::Key(key)) => self.handle_key_events(key),
      Some(crate::tui::Event::Paste(text)) => {
        self.input.insert_str(text.replace(&['\r', '\n'][..], " "));
        Ok(Some(Action::Render))
      },
      _ => Ok(None),
    }
  }

  pub(super) fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    if self.show_details || self.show_help {
      // any plain key dismisses a popup
      self.show_details = false;
      self.show_help = false;
      return Ok(Some(Action::Render));
    }

    match key.code {
      KeyCode::Enter if !key.modifiers.contains(KeyModifiers::ALT) => Ok(self.submit()),
      _ => {
        self.input.input(key);
        Ok(Some(Action::Render))
      },
    }
  }

  /// Takes the typed question out of the input. One question at a time.
  fn submit(&mut self) -> Option<Action> {
    if self.is_busy {
      self.set_flash("Still answering the previous question");
      return None;
    }

    let question = self.input_text();
    if question.trim().is_empty() {
      return None;
    }

    self.input = new_input();
    Some(Action::Ask(question.trim().to_string()))
  }
}
