pub mod api;

use crate::cli::ServeArgs;
use crate::llm::chat::new_client as new_chat_client;
use crate::relay::ChatRelay;
use log::{ info, warn };
use std::error::Error;

pub struct Server {
    args: ServeArgs,
}

impl Server {
    pub fn new(args: ServeArgs) -> Self {
        Self { args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let config = self.args.llm_config()?;
        let relay = ChatRelay::new(new_chat_client(&config)?);
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={}",
            config.llm_type,
            relay.model(),
            config.base_url.as_deref().unwrap_or("adapter default")
        );
        warn!("Relay endpoint has no authentication. Any origin may call POST /chat.");

        api::start_http_server(relay, &self.args).await
    }
}
