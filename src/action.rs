use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{components::ComponentKind, conversation::Message, pipeline::TurnReport, sql::ConnectionDescriptor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
  Tick,
  Render,
  Resize(u16, u16),
  Suspend,
  Resume,
  Quit,
  Error(String),
  Help,
  FocusSettings,
  FocusChat,
  SelectComponent(ComponentKind),
  NextField,
  PrevField,
  SubmitConnection,
  Connect(ConnectionDescriptor),
  Connected(String),
  ConnectionFailed(String),
  Ask(String),
  TurnStarted,
  ConversationUpdated(Vec<Message>),
  TurnCompleted(Option<TurnReport>),
  ScrollUp,
  ScrollDown,
  ToggleQueryDetails,
  CopyAnswer,
  CopyQuery,
  /// Short notice shown under the chat input.
  Notify(String),
}
