use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use sql_chat::llm::ChatModel;

/// A chat model that replays queued replies and remembers every prompt it saw.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(text.to_string()))
    }

    pub fn fail(self, error: &str) -> Self {
        self.push(Err(error.to_string()))
    }

    fn push(self, reply: Result<String, String>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(eyre!(e)),
            None => Err(eyre!("scripted model has no replies left")),
        }
    }
}
