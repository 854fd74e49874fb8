pub mod gemini;
pub mod hosted;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use super::{ LlmConfig, LlmType };
use self::gemini::GeminiChatClient;
use self::hosted::HostedChatClient;
use crate::models::chat::Turn;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider configuration error: {0}")]
    Config(String),
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("provider blocked the response: {0}")]
    Blocked(String),
    #[error("provider returned no text")]
    EmptyResponse,
    #[error("provider backend error: {0}")]
    Backend(String),
}

/// A generative model reachable as a chat: seed it with `history`, send
/// `message`, get one complete text reply back.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(
        &self,
        history: &[Turn],
        message: &str
    ) -> Result<String, ProviderError>;

    fn get_model(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ProviderError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama
        | LlmType::OpenAI
        | LlmType::Anthropic
        | LlmType::DeepSeek
        | LlmType::XAI
        | LlmType::Groq => {
            let specific_client = HostedChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}
