//! The per-turn flow: fetch the schema, ask the model for SQL, run it, ask the
//! model to describe the result.
//!
//! Generated SQL is executed as-is, with no parameterization or allow-list.
//! Point the session at a read-only account unless the operator is trusted.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{llm::ChatModel, prompt::Prompts, schema::render_schema, sql::Queryer};

/// What happened when the generated statement ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOutcome {
  Rows(String),
  Failed(String),
}

impl QueryOutcome {
  pub fn text(&self) -> &str {
    match self {
      Self::Rows(text) | Self::Failed(text) => text,
    }
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, Self::Failed(_))
  }
}

/// Everything produced by one completed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
  pub question: String,
  pub sql: String,
  pub outcome: QueryOutcome,
  pub answer: String,
}

/// Doubles backslashes and escapes underscores so result text survives being
/// embedded in the answer prompt.
pub fn escape_result(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '\\' => escaped.push_str("\\\\"),
      '_' => escaped.push_str("\\_"),
      c => escaped.push(c),
    }
  }
  escaped
}

pub struct Pipeline {
  model: Arc<dyn ChatModel>,
  prompts: Prompts,
}

impl Pipeline {
  pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts) -> Self {
    Self { model, prompts }
  }

  pub async fn fetch_schema(&self, db: &dyn Queryer) -> Result<String> {
    let tables = db.table_info().await.wrap_err("failed to fetch schema")?;
    debug!("Fetched schema with {} tables", tables.len());
    Ok(render_schema(&tables))
  }

  pub async fn generate_sql(&self, schema: &str, chat_history: &str, question: &str) -> Result<String> {
    let prompt = self.prompts.sql_prompt(schema, chat_history, question)?;
    let sql = self.model.complete(&prompt).await.wrap_err("SQL generation failed")?;
    Ok(sql.trim().to_string())
  }

  /// Runs the statement; a database error becomes part of the outcome rather
  /// than an error of the turn.
  pub async fn execute(&self, db: &dyn Queryer, sql: &str) -> QueryOutcome {
    match db.run(sql).await {
      Ok(rows) => {
        debug!("Query returned {} rows", rows.row_count());
        QueryOutcome::Rows(rows.render())
      },
      Err(e) => {
        warn!("Query failed: {e}");
        QueryOutcome::Failed(e.to_string())
      },
    }
  }

  pub async fn compose_answer(
    &self,
    schema: &str,
    chat_history: &str,
    question: &str,
    sql: &str,
    outcome: &QueryOutcome,
  ) -> Result<String> {
    // row text is escaped, database errors are passed through verbatim
    let response = match outcome {
      QueryOutcome::Rows(text) => escape_result(text),
      QueryOutcome::Failed(text) => text.clone(),
    };
    let prompt = self.prompts.answer_prompt(schema, chat_history, question, sql, &response)?;
    let answer = self.model.complete(&prompt).await.wrap_err("answer generation failed")?;
    Ok(answer.trim().to_string())
  }

  pub async fn run(&self, db: &dyn Queryer, chat_history: &str, question: &str) -> Result<TurnReport> {
    let schema = self.fetch_schema(db).await?;
    let sql = self.generate_sql(&schema, chat_history, question).await?;
    info!("Generated SQL: {sql}");
    let outcome = self.execute(db, &sql).await;
    let answer = self.compose_answer(&schema, chat_history, question, &sql, &outcome).await?;

    Ok(TurnReport { question: question.to_string(), sql, outcome, answer })
  }
}
