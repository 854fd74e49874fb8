use clap::{ Parser, Subcommand };
use crate::llm::{ parse_llm_type, LlmConfig };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the relay endpoint (POST /chat)
    Serve(ServeArgs),
    /// Chat with a running relay from the terminal
    Chat(ChatArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port for the HTTP server to listen on (all interfaces).
    #[arg(long, env = "PORT", default_value = "3001")]
    pub port: u16,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider (gemini, ollama, openai, anthropic, deepseek, xai, groq)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini")]
    pub llm_type: String,

    /// API Key for the LLM provider
    #[arg(long, env = "API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Model identifier (e.g., gemini-2.5-flash, gpt-4o-mini, llama3.2). No default, rely on adapter defaults if None
    #[arg(long, env = "CHAT_MODEL")]
    pub model: Option<String>,

    /// Base URL for the provider API. Adapters use their own default if unset.
    #[arg(long, env = "CHAT_BASE_URL")]
    pub base_url: Option<String>,

    // --- TLS Args ---
    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,
}

impl ServeArgs {
    pub fn llm_config(&self) -> Result<LlmConfig, String> {
        let api_key = if !self.api_key.is_empty() { Some(self.api_key.clone()) } else { None };
        Ok(LlmConfig {
            llm_type: parse_llm_type(&self.llm_type)?,
            api_key,
            model: self.model.clone().filter(|m| !m.trim().is_empty()),
            base_url: self.base_url.clone().filter(|u| !u.trim().is_empty()),
        })
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Full URL of the relay's chat endpoint
    #[arg(long, env = "CHAT_ENDPOINT", default_value = "http://localhost:3001/chat")]
    pub endpoint: String,
}
