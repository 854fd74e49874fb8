use crate::llm::chat::{ ChatClient, ProviderError };
use crate::models::chat::ChatRequest;
use log::info;
use std::sync::Arc;
use thiserror::Error;

/// Reply body sent in place of any failure detail.
pub const GENERIC_FAILURE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed chat request: {0}")]
    MalformedRequest(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Stateless bridge between `POST /chat` and the model provider. Every call
/// builds its chat from the history the caller sent.
#[derive(Clone)]
pub struct ChatRelay {
    client: Arc<dyn ChatClient>,
}

impl ChatRelay {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    pub fn model(&self) -> String {
        self.client.get_model()
    }

    pub async fn relay(&self, request: &ChatRequest) -> Result<String, RelayError> {
        info!(
            "Relaying message to {} with {} prior turns",
            self.client.get_model(),
            request.history.len()
        );
        let text = self.client.send_message(&request.history, &request.message).await?;
        Ok(text)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::StubChatClient;
    use crate::models::chat::Turn;

    #[tokio::test]
    async fn forwards_history_and_message_unchanged() {
        let stub = Arc::new(StubChatClient::replying("Sure."));
        let relay = ChatRelay::new(stub.clone());
        let history = vec![Turn::user("Hi"), Turn::model("Hello!"), Turn::model("Anything else?")];
        let request = ChatRequest { history: history.clone(), message: "Yes".into() };

        let reply = relay.relay(&request).await.unwrap();

        assert_eq!(reply, "Sure.");
        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, history);
        assert_eq!(calls[0].1, "Yes");
    }

    #[tokio::test]
    async fn provider_failure_becomes_relay_error() {
        let relay = ChatRelay::new(Arc::new(StubChatClient::failing()));
        let request = ChatRequest { history: vec![], message: "Hi".into() };

        let result = relay.relay(&request).await;

        assert!(matches!(result, Err(RelayError::Provider(ProviderError::Backend(_)))));
    }
}
