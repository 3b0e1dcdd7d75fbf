use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use futures::future::BoxFuture;

use crate::{
    config::LlmConfig,
    llm::{
        CompletionError, Model,
        completion::{CompletionResponse, Message, Role, Usage},
        request::CompletionRequest,
    },
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Any OpenAI compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAI {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAI {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn from_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::from_url(&config.base_url, &config.api_key).set_model(&config.model)
    }

    pub fn set_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Model for OpenAI {
    fn completion(
        &self,
        request: CompletionRequest,
    ) -> BoxFuture<'static, Result<CompletionResponse, CompletionError>> {
        let client = self.client.clone();
        let model = self.model.clone();

        Box::pin(async move {
            let messages = build_messages(&request)?;

            let mut args = CreateChatCompletionRequestArgs::default();
            args.model(model).messages(messages);
            if let Some(temperature) = request.temperature {
                args.temperature(temperature as f32);
            }
            if let Some(max_tokens) = request.max_tokens {
                args.max_completion_tokens(max_tokens);
            }

            let response = client.chat().create(args.build()?).await?;
            tracing::debug!(
                "| openai | Model: {} | Choices: {}",
                response.model,
                response.choices.len()
            );

            let usage = response.usage.map(|usage| Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            });
            let choice = response
                .choices
                .into_iter()
                .filter_map(|choice| choice.message.content)
                .collect();

            Ok(CompletionResponse { choice, usage })
        })
    }
}

/// System prompt first, then the history, then the prompt itself.
fn build_messages(
    request: &CompletionRequest,
) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
    let mut messages = Vec::with_capacity(request.chat_history.len() + 2);

    if let Some(system_prompt) = &request.system_prompt {
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt.as_str())
                .build()?
                .into(),
        );
    }

    for message in request.chat_history.iter().chain([&request.prompt]) {
        messages.push(convert_message(message)?);
    }

    Ok(messages)
}

fn convert_message(message: &Message) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    Ok(match message.role {
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
    })
}
