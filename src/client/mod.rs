pub mod http;
pub mod terminal;

use async_trait::async_trait;
use log::{ error, warn };
use thiserror::Error;
use crate::models::chat::{ ChatRequest, Turn };

pub const FALLBACK_REPLY: &str = "Sorry, I am busy right now. Please try again later..";
pub const THINKING_NOTICE: &str = "Wait, I'm thinking..";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay responded with status {0}")]
    Status(reqwest::StatusCode),
}

/// Why a submit did nothing. Neither case touches the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    EmptyInput,
    AwaitingReply,
}

#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn post_chat(&self, request: &ChatRequest) -> Result<String, ClientError>;
}

/// In-memory state of one chat: the conversation, the pending input and
/// the loading flag that guards against a second submit while waiting.
#[derive(Debug, Default)]
pub struct ChatSession {
    conversation: Vec<Turn>,
    input: String,
    loading: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    /// Appends the user turn and hands back the request to send. The
    /// request's history is the conversation as it was before this turn.
    pub fn begin_submit(&mut self) -> Result<ChatRequest, SubmitRejected> {
        if self.loading {
            return Err(SubmitRejected::AwaitingReply);
        }
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }

        let request = ChatRequest {
            history: self.conversation.clone(),
            message: message.clone(),
        };
        self.conversation.push(Turn::user(message));
        self.input.clear();
        self.loading = true;
        Ok(request)
    }

    /// Records the outcome of the pending request as a model turn.
    pub fn complete(&mut self, outcome: Result<String, ClientError>) -> Option<&Turn> {
        if !self.loading {
            warn!("Ignoring relay outcome with no request pending");
            return None;
        }
        Some(self.settle(outcome))
    }

    pub async fn submit<T: RelayTransport + ?Sized>(
        &mut self,
        transport: &T
    ) -> Result<&Turn, SubmitRejected> {
        let request = self.begin_submit()?;
        let outcome = transport.post_chat(&request).await;
        Ok(self.settle(outcome))
    }

    // Caller guarantees a request is pending.
    fn settle(&mut self, outcome: Result<String, ClientError>) -> &Turn {
        let text = match outcome {
            Ok(text) => text,
            Err(e) => {
                error!("Error fetching from relay: {}", e);
                FALLBACK_REPLY.to_string()
            }
        };
        self.conversation.push(Turn::model(text));
        self.loading = false;
        &self.conversation[self.conversation.len() - 1]
    }
}
