use async_trait::async_trait;
use reqwest::Client as HttpClient;
use log::debug;

use super::{ ClientError, RelayTransport };
use crate::models::chat::{ ChatReply, ChatRequest };

/// Posts chat requests to a relay endpoint over HTTP.
#[derive(Clone)]
pub struct HttpRelayClient {
    http: HttpClient,
    endpoint: String,
}

impl HttpRelayClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayTransport for HttpRelayClient {
    async fn post_chat(&self, request: &ChatRequest) -> Result<String, ClientError> {
        debug!(
            "POST {} with {} history turns",
            self.endpoint,
            request.history.len()
        );
        let resp = self.http.post(&self.endpoint).json(request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let reply = resp.json::<ChatReply>().await?;
        Ok(reply.message)
    }
}
