use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::{self, Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// A hosted chat model. Each call is one blocking round trip; the caller gets
/// the raw completion text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
  async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_model")]
  pub model: String,
  #[serde(default)]
  pub temperature: f32,
  #[serde(default = "default_api_key_env")]
  pub api_key_env: String,
  /// No timeout unless set
  #[serde(default)]
  pub request_timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      model: default_model(),
      temperature: 0.0,
      api_key_env: default_api_key_env(),
      request_timeout_secs: None,
    }
  }
}

fn default_base_url() -> String {
  GROQ_BASE_URL.to_string()
}

fn default_model() -> String {
  DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
  DEFAULT_API_KEY_ENV.to_string()
}

impl LlmConfig {
  pub fn api_key(&self) -> Option<String> {
    std::env::var(&self.api_key_env).ok().filter(|key| !key.is_empty())
  }

  pub fn completions_url(&self) -> String {
    format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
  role: String,
  content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage>,
  temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChatMessage,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint (Groq by default).
pub struct OpenAiCompatible {
  client: reqwest::Client,
  url: String,
  model: String,
  temperature: f32,
  api_key: Option<String>,
}

impl OpenAiCompatible {
  pub fn new(config: &LlmConfig) -> Result<Self> {
    let api_key = config.api_key();
    if api_key.is_none() {
      tracing::warn!("{} is not set; requests to {} will be unauthenticated", config.api_key_env, config.base_url);
    }
    Self::with_api_key(config, api_key)
  }

  pub fn with_api_key(config: &LlmConfig, api_key: Option<String>) -> Result<Self> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.request_timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().wrap_err("failed to build http client")?;

    Ok(Self {
      client,
      url: config.completions_url(),
      model: config.model.clone(),
      temperature: config.temperature,
      api_key,
    })
  }
}

#[async_trait]
impl ChatModel for OpenAiCompatible {
  async fn complete(&self, prompt: &str) -> Result<String> {
    let body = ChatRequest {
      model: &self.model,
      messages: vec![ChatMessage { role: "user".to_string(), content: prompt.to_string() }],
      temperature: self.temperature,
    };

    let mut request = self.client.post(&self.url).json(&body);
    if let Some(key) = &self.api_key {
      request = request.bearer_auth(key);
    }

    let resp = request.send().await.map_err(|e| eyre::eyre!("LLM request to {} failed: {e}", self.url))?;
    let status = resp.status();
    debug!("LLM responded with HTTP {status}");
    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      eyre::bail!("LLM HTTP {status}: {}", text.trim());
    }

    let text = resp.text().await.wrap_err("failed to read LLM response body")?;
    parse_completion(&text)
  }
}

fn parse_completion(body: &str) -> Result<String> {
  let response: ChatResponse = serde_json::from_str(body).wrap_err("LLM returned invalid JSON")?;
  let choice = response.choices.into_iter().next().ok_or_else(|| eyre::eyre!("LLM returned no choices"))?;
  Ok(strip_ansi_escapes::strip_str(choice.message.content))
}
