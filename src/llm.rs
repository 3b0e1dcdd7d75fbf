//! The language model seam. Everything that talks to an inference provider goes
//! through [`Model`]; the crew and the chat loop only ever see this trait.
pub mod completion;
pub mod provider;
pub mod request;

use futures::future::BoxFuture;
use thiserror::Error;

use self::{completion::CompletionResponse, request::CompletionRequest};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("OpenAI error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),
    #[error("No choice found in the completion response")]
    NoChoiceFound,
    #[error("Model returned an empty response")]
    EmptyResponse,
    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// A chat-completion provider.
///
/// The returned future owns everything it needs, so callers may hold a model
/// behind an `Arc<dyn Model>` and await completions without borrowing it.
#[cfg_attr(test, mockall::automock)]
pub trait Model: Send + Sync {
    fn completion(
        &self,
        request: CompletionRequest,
    ) -> BoxFuture<'static, Result<CompletionResponse, CompletionError>>;
}
