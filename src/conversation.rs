use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum::Display;

pub const GREETING: &str = "Hello I'm SQL Assistant. Ask me Anything About your database.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Role {
  #[strum(serialize = "AI")]
  Assistant,
  #[strum(serialize = "Human")]
  User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub role: Role,
  pub content: String,
  pub timestamp: DateTime<Local>,
}

impl Message {
  pub fn assistant(content: impl Into<String>) -> Self {
    Self { role: Role::Assistant, content: content.into(), timestamp: Local::now() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into(), timestamp: Local::now() }
  }
}

/// Append-only chat transcript for one session. Entries are never reordered,
/// edited or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
  messages: Vec<Message>,
}

impl Default for Conversation {
  fn default() -> Self {
    Self::new()
  }
}

impl Conversation {
  pub fn new() -> Self {
    Self { messages: vec![Message::assistant(GREETING)] }
  }

  pub fn push(&mut self, message: Message) -> &Message {
    self.messages.push(message);
    &self.messages[self.messages.len() - 1]
  }

  pub fn messages(&self) -> &[Message] {
    &self.messages
  }

  pub fn len(&self) -> usize {
    self.messages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.messages.is_empty()
  }

  pub fn last(&self) -> Option<&Message> {
    self.messages.last()
  }

  /// History as it is written into prompts, one `Speaker: text` line per entry.
  pub fn transcript(&self) -> String {
    self.messages.iter().map(|m| format!("{}: {}", m.role, m.content)).collect::<Vec<_>>().join("\n")
  }
}
