use color_eyre::eyre::{Result, WrapErr};
use minijinja::{context, Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SQL_TEMPLATE: &str = r#"You are a data analyst at a company. You are interacting with a user who is asking you questions about the company's database.
Based on the table schema below, write a SQL query that would answer the user's question. Take the conversation history into account.

<SCHEMA>{{ schema }}</SCHEMA>

Conversation History: {{ chat_history }}

Write only the SQL query and nothing else. Do not wrap the SQL query in any other text, not even backticks.

For example:
Question: which 3 artists have the most tracks?
SQL Query: SELECT ArtistId, COUNT(*) FROM Track GROUP BY ArtistId ORDER BY COUNT(*) DESC LIMIT 3;
Question: Name 10 artists
SQL Query: SELECT Name FROM Artist LIMIT 10;

Your turn:
Only give the SQL query, without messages such as "certainly" or "of course".
Do not use the AS clause or any other alias in the SQL query. Write SELECT count(Name) FROM Table; and never SELECT count(Name) AS CountName FROM Table;
A query that contains an AS clause is forbidden.

Question: {{ question }}
SQL Query:"#;

pub const DEFAULT_ANSWER_TEMPLATE: &str = r#"You are a data analyst. You are interacting with a user who is asking you questions about the database.
Based on the table schema below, question, sql query, and sql response, write a natural language response.
<SCHEMA>{{ schema }}</SCHEMA>

Conversation History: {{ chat_history }}
SQL Query: <SQL>{{ query }}</SQL>
User question: {{ question }}
SQL Response: {{ response }}"#;

/// Optional template overrides from the `prompts` config section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
  #[serde(default)]
  pub sql_template: Option<String>,
  #[serde(default)]
  pub answer_template: Option<String>,
}

/// The two prompt templates of a turn. Templates are checked when the set is
/// built so a broken override fails at startup, not mid-conversation.
#[derive(Clone, Debug)]
pub struct Prompts {
  sql_template: String,
  answer_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self { sql_template: DEFAULT_SQL_TEMPLATE.to_string(), answer_template: DEFAULT_ANSWER_TEMPLATE.to_string() }
  }
}

impl Prompts {
  pub fn new(sql_template: impl Into<String>, answer_template: impl Into<String>) -> Result<Self> {
    let prompts = Self { sql_template: sql_template.into(), answer_template: answer_template.into() };
    let env = environment();
    env.template_from_str(&prompts.sql_template).wrap_err("invalid SQL prompt template")?;
    env.template_from_str(&prompts.answer_template).wrap_err("invalid answer prompt template")?;
    Ok(prompts)
  }

  pub fn from_config(config: &PromptConfig) -> Result<Self> {
    Self::new(
      config.sql_template.as_deref().unwrap_or(DEFAULT_SQL_TEMPLATE),
      config.answer_template.as_deref().unwrap_or(DEFAULT_ANSWER_TEMPLATE),
    )
  }

  pub fn sql_prompt(&self, schema: &str, chat_history: &str, question: &str) -> Result<String> {
    let prompt = environment().render_str(
      &self.sql_template,
      context! { schema => schema, chat_history => chat_history, question => question },
    )?;
    Ok(prompt)
  }

  pub fn answer_prompt(
    &self,
    schema: &str,
    chat_history: &str,
    question: &str,
    query: &str,
    response: &str,
  ) -> Result<String> {
    let prompt = environment().render_str(
      &self.answer_template,
      context! {
        schema => schema,
        chat_history => chat_history,
        question => question,
        query => query,
        response => response,
      },
    )?;
    Ok(prompt)
  }
}

fn environment() -> Environment<'static> {
  let mut env = Environment::new();
  env.set_undefined_behavior(UndefinedBehavior::Strict);
  env
}
