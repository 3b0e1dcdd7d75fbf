use std::fmt;

use serde::{Deserialize, Serialize};

use super::CompletionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prompt: {}, completion: {}, total: {}",
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens()
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub choice: Vec<String>,
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// A single-choice response, mostly useful for stub models.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            choice: vec![text.into()],
            usage: None,
        }
    }

    /// Take the first choice. A missing or blank choice counts as a malformed
    /// response from the provider.
    pub fn into_text(self) -> Result<String, CompletionError> {
        let text = self
            .choice
            .into_iter()
            .next()
            .ok_or(CompletionError::NoChoiceFound)?;
        if text.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(text)
    }
}
