//! Two-party chats between conversable agents.
//!
//! A sender opens with a message, then the recipient and the sender take
//! turns replying. One turn is a recipient reply followed, when another turn
//! remains, by a sender reply.
use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::{
    agent::AgentError,
    conversation::{AgentConversation, Role},
    llm::{
        Model,
        completion::Message,
        request::{CompletionRequest, GenerationConfig},
    },
};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Conversable agent's name must be set.")]
    EmptyName,
    #[error("A chat needs two differently named agents, got '{0}' twice")]
    SameParticipant(String),
    #[error("max_turns must be at least 1")]
    InvalidMaxTurns,
    #[error("Agent error: {0}")]
    AgentError(#[from] AgentError),
}

#[derive(Debug, Clone)]
pub struct ConversableAgent {
    name: String,
    system_message: String,
    stop_words: HashSet<String>,
    generation: GenerationConfig,
}

impl ConversableAgent {
    pub fn builder() -> ConversableAgentBuilder {
        ConversableAgentBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Whether a message sent to this agent should end the chat.
    pub fn is_termination_msg(&self, message: &str) -> bool {
        self.stop_words.iter().any(|word| message.contains(word))
    }

    async fn generate_reply(
        &self,
        model: &dyn Model,
        conversation: &AgentConversation,
    ) -> Result<String, AgentError> {
        let mut chat_history = conversation.history_for(&self.name);
        // The newest message is the other party's and becomes the prompt.
        let prompt = chat_history
            .pop()
            .unwrap_or_else(|| Message::user(String::new()));

        let request = CompletionRequest {
            prompt,
            system_prompt: Some(self.system_message.clone()),
            chat_history,
            temperature: self.generation.temperature,
            max_tokens: self.generation.max_tokens,
        };

        let response = model.completion(request).await?;
        Ok(response.into_text()?)
    }
}

#[derive(Default)]
pub struct ConversableAgentBuilder {
    name: String,
    system_message: String,
    stop_words: HashSet<String>,
    generation: GenerationConfig,
}

impl ConversableAgentBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    pub fn add_stop_word(mut self, stop_word: impl Into<String>) -> Self {
        self.stop_words.insert(stop_word.into());
        self
    }

    pub fn stop_words(self, stop_words: Vec<String>) -> Self {
        stop_words
            .into_iter()
            .fold(self, |builder, stop_word| builder.add_stop_word(stop_word))
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.generation.temperature = Some(temperature);
        self
    }

    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn build(self) -> Result<ConversableAgent, ChatError> {
        if self.name.trim().is_empty() {
            return Err(ChatError::EmptyName);
        }

        Ok(ConversableAgent {
            name: self.name,
            system_message: self.system_message,
            stop_words: self.stop_words,
            generation: self.generation,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResult {
    pub chat_history: AgentConversation,
    /// Content of the last message exchanged.
    pub summary: String,
    /// Completed turns, counted by recipient replies.
    pub turns: usize,
}

/// Let `sender` open a chat with `recipient` and alternate for at most
/// `max_turns` turns. Every received message, the opening one included, is
/// checked against the receiver's stop words. A provider failure ends the
/// chat with an error.
pub async fn initiate_chat(
    sender: &ConversableAgent,
    recipient: &ConversableAgent,
    model: &dyn Model,
    message: impl Into<String>,
    max_turns: usize,
) -> Result<ChatResult, ChatError> {
    if max_turns == 0 {
        return Err(ChatError::InvalidMaxTurns);
    }
    if sender.name == recipient.name {
        return Err(ChatError::SameParticipant(sender.name.clone()));
    }

    let mut conversation =
        AgentConversation::new(format!("{} -> {}", sender.name, recipient.name));
    let message: String = message.into();
    let mut ended = recipient.is_termination_msg(&message);
    conversation.add(Role::User(sender.name.clone()), message);

    let mut turns = 0;
    while !ended && turns < max_turns {
        let reply = recipient.generate_reply(model, &conversation).await?;
        conversation.add(Role::Assistant(recipient.name.clone()), &reply);
        turns += 1;
        tracing::debug!(
            "| chat | {} -> {} | Turn: {}/{}",
            recipient.name,
            sender.name,
            turns,
            max_turns
        );

        if turns == max_turns || sender.is_termination_msg(&reply) {
            break;
        }

        let reply = sender.generate_reply(model, &conversation).await?;
        conversation.add(Role::User(sender.name.clone()), &reply);
        ended = recipient.is_termination_msg(&reply);
    }

    let summary = conversation
        .last()
        .map(|message| message.content.to_string())
        .unwrap_or_default();

    Ok(ChatResult {
        chat_history: conversation,
        summary,
        turns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{
        CompletionError, MockModel,
        completion::{CompletionResponse, Role as MessageRole},
    };

    fn pair() -> (ConversableAgent, ConversableAgent) {
        let user_proxy = ConversableAgent::builder()
            .name("user_proxy")
            .system_message("proxy")
            .build()
            .unwrap();
        let assistant = ConversableAgent::builder()
            .name("assistant")
            .system_message("travel")
            .temperature(0.7)
            .build()
            .unwrap();
        (user_proxy, assistant)
    }

    /// Replies "<system message>#<history length>".
    fn echo_model(times: usize) -> MockModel {
        let mut model = MockModel::new();
        model
            .expect_completion()
            .times(times)
            .returning(|request| {
                let reply = format!(
                    "{}#{}",
                    request.system_prompt.unwrap_or_default(),
                    request.chat_history.len()
                );
                Box::pin(async move { Ok(CompletionResponse::text(reply)) })
            });
        model
    }

    #[tokio::test]
    async fn test_turns_alternate_until_max_turns() {
        let (user_proxy, assistant) = pair();
        let model = echo_model(3);

        let result = initiate_chat(&user_proxy, &assistant, &model, "Tips for Iceland?", 2)
            .await
            .unwrap();

        let history = &result.chat_history.history;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::User("user_proxy".to_owned()));
        assert_eq!(history[1].role, Role::Assistant("assistant".to_owned()));
        assert_eq!(history[1].content.to_string(), "travel#0");
        assert_eq!(history[2].role, Role::User("user_proxy".to_owned()));
        assert_eq!(history[2].content.to_string(), "proxy#1");
        assert_eq!(history[3].content.to_string(), "travel#2");
        assert_eq!(result.turns, 2);
        assert_eq!(result.summary, "travel#2");
    }

    #[tokio::test]
    async fn test_single_turn_is_one_reply() {
        let (user_proxy, assistant) = pair();
        let model = echo_model(1);

        let result = initiate_chat(&user_proxy, &assistant, &model, "Hi", 1)
            .await
            .unwrap();
        assert_eq!(result.chat_history.len(), 2);
        assert_eq!(result.turns, 1);
    }

    #[tokio::test]
    async fn test_each_party_sees_its_own_perspective() {
        let (user_proxy, assistant) = pair();

        let mut model = MockModel::new();
        model
            .expect_completion()
            .withf(|request| request.system_prompt.as_deref() == Some("travel"))
            .times(1)
            .returning(|request| {
                assert!(request.chat_history.is_empty());
                assert_eq!(request.prompt, Message::user("Tips for Iceland?"));
                assert_eq!(request.temperature, Some(0.7));
                Box::pin(async { Ok(CompletionResponse::text("Fly midweek.")) })
            });
        model
            .expect_completion()
            .withf(|request| request.system_prompt.as_deref() == Some("proxy"))
            .times(1)
            .returning(|request| {
                assert_eq!(request.chat_history.len(), 1);
                assert_eq!(request.chat_history[0].role, MessageRole::Assistant);
                assert_eq!(request.prompt, Message::user("Fly midweek."));
                Box::pin(async { Ok(CompletionResponse::text("TERMINATE")) })
            });

        let assistant = ConversableAgent {
            stop_words: HashSet::from(["TERMINATE".to_owned()]),
            ..assistant
        };
        let result = initiate_chat(&user_proxy, &assistant, &model, "Tips for Iceland?", 3)
            .await
            .unwrap();
        assert_eq!(result.turns, 1);
        assert_eq!(result.summary, "TERMINATE");
    }

    #[tokio::test]
    async fn test_stop_word_ends_chat_early() {
        let (_, assistant) = pair();
        let user_proxy = ConversableAgent::builder()
            .name("user_proxy")
            .add_stop_word("TERMINATE")
            .build()
            .unwrap();

        let mut model = MockModel::new();
        model
            .expect_completion()
            .times(1)
            .returning(|_| Box::pin(async { Ok(CompletionResponse::text("All done. TERMINATE")) }));

        let result = initiate_chat(&user_proxy, &assistant, &model, "Hi", 5)
            .await
            .unwrap();
        assert_eq!(result.chat_history.len(), 2);
        assert_eq!(result.turns, 1);
    }

    #[tokio::test]
    async fn test_opening_message_can_end_chat() {
        let (user_proxy, _) = pair();
        let assistant = ConversableAgent::builder()
            .name("assistant")
            .add_stop_word("TERMINATE")
            .build()
            .unwrap();
        let model = MockModel::new();

        let result = initiate_chat(&user_proxy, &assistant, &model, "TERMINATE", 2)
            .await
            .unwrap();
        assert_eq!(result.chat_history.len(), 1);
        assert_eq!(result.turns, 0);
        assert_eq!(result.summary, "TERMINATE");
    }

    #[tokio::test]
    async fn test_invalid_chats_are_rejected() {
        let (user_proxy, assistant) = pair();
        let model = MockModel::new();

        assert!(matches!(
            initiate_chat(&user_proxy, &assistant, &model, "Hi", 0).await,
            Err(ChatError::InvalidMaxTurns)
        ));
        assert!(matches!(
            initiate_chat(&user_proxy, &user_proxy, &model, "Hi", 1).await,
            Err(ChatError::SameParticipant(_))
        ));
        assert!(matches!(
            ConversableAgent::builder().name("  ").build(),
            Err(ChatError::EmptyName)
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_ends_chat() {
        let (user_proxy, assistant) = pair();
        let mut model = MockModel::new();
        model.expect_completion().times(1).returning(|_| {
            Box::pin(async { Err(CompletionError::ProviderError("unauthorized".to_owned())) })
        });

        let result = initiate_chat(&user_proxy, &assistant, &model, "Hi", 2).await;
        assert!(matches!(
            result,
            Err(ChatError::AgentError(AgentError::CompletionError(
                CompletionError::ProviderError(_)
            )))
        ));
    }
}
