use serde::Serialize;

use super::completion::Message;

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub prompt: Message,
    pub system_prompt: Option<String>,
    pub chat_history: Vec<Message>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Sampling parameters applied to every request a crew or chat sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl From<&crate::config::LlmConfig> for GenerationConfig {
    fn from(config: &crate::config::LlmConfig) -> Self {
        Self {
            temperature: Some(config.temperature),
            max_tokens: config.max_tokens,
        }
    }
}
