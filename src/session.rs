use std::sync::Arc;

use color_eyre::eyre::Result;
use tracing::{error, info};

use crate::{
  conversation::{Conversation, Message},
  pipeline::{Pipeline, TurnReport},
  sql::{self, ConnectionDescriptor, Queryer},
};

pub const NOT_CONNECTED: &str = "Please connect to a database first.";

/// One chat session: its transcript, the open connection (if any) and the
/// pipeline every turn runs through.
pub struct Session {
  conversation: Conversation,
  db: Option<Arc<dyn Queryer>>,
  descriptor: Option<ConnectionDescriptor>,
  pipeline: Pipeline,
  pending_question: Option<String>,
  last_report: Option<TurnReport>,
}

impl Session {
  pub fn new(pipeline: Pipeline) -> Self {
    Self {
      conversation: Conversation::new(),
      db: None,
      descriptor: None,
      pipeline,
      pending_question: None,
      last_report: None,
    }
  }

  pub fn conversation(&self) -> &Conversation {
    &self.conversation
  }

  pub fn is_connected(&self) -> bool {
    self.db.is_some()
  }

  pub fn descriptor(&self) -> Option<&ConnectionDescriptor> {
    self.descriptor.as_ref()
  }

  pub fn last_report(&self) -> Option<&TurnReport> {
    self.last_report.as_ref()
  }

  pub fn is_busy(&self) -> bool {
    self.pending_question.is_some()
  }

  /// Opens a connection and makes it the session's. On failure nothing about
  /// the session changes.
  pub async fn connect(&mut self, descriptor: &ConnectionDescriptor) -> Result<()> {
    let db = sql::connect(descriptor).await?;
    self.use_connection(db, descriptor.clone());
    Ok(())
  }

  pub fn use_connection(&mut self, db: Arc<dyn Queryer>, descriptor: ConnectionDescriptor) {
    info!("Session connected to {descriptor}");
    self.db = Some(db);
    self.descriptor = Some(descriptor);
  }

  /// Records the user's question. Blank input is ignored and returns `false`.
  pub fn begin_turn(&mut self, question: &str) -> bool {
    let question = question.trim();
    if question.is_empty() || self.pending_question.is_some() {
      return false;
    }
    self.conversation.push(Message::user(question));
    self.pending_question = Some(question.to_string());
    true
  }

  /// Answers the pending question, appending exactly one assistant entry.
  pub async fn finish_turn(&mut self) -> Option<&Message> {
    let question = self.pending_question.take()?;
    self.last_report = None;

    let reply = match &self.db {
      None => NOT_CONNECTED.to_string(),
      Some(db) => {
        let history = self.conversation.transcript();
        match self.pipeline.run(db.as_ref(), &history, &question).await {
          Ok(report) => {
            let answer = report.answer.clone();
            self.last_report = Some(report);
            answer
          },
          Err(e) => {
            error!("Turn failed: {e:?}");
            format!("{e:#}")
          },
        }
      },
    };

    Some(self.conversation.push(Message::assistant(reply)))
  }

  pub async fn ask(&mut self, question: &str) -> Option<&Message> {
    if !self.begin_turn(question) {
      return None;
    }
    self.finish_turn().await
  }
}
