pub mod models;
pub mod server;
pub mod llm;
pub mod cli;
pub mod relay;
pub mod client;

use cli::{ Args, Command };
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve_args) => {
            info!("--- Relay Configuration ---");
            info!("Port: {}", serve_args.port);
            info!("Chat LLM Type: {}", serve_args.llm_type);
            info!("Chat Model: {}", serve_args.model.as_deref().unwrap_or("adapter default"));
            info!("Chat Base URL: {}", serve_args.base_url.as_deref().unwrap_or("adapter default"));
            info!("API Key Set: {}", !serve_args.api_key.is_empty());
            info!("TLS Enabled: {}", serve_args.enable_tls);
            info!("---------------------------");

            let server = Server::new(serve_args);
            server.run().await?;
        }
        Command::Chat(chat_args) => {
            client::terminal::run_chat(&chat_args).await?;
        }
    }

    Ok(())
}
