use async_trait::async_trait;
use log::info;

use super::{ ChatClient, ProviderError };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::{ Role, Turn };
use rllm::chat::{ ChatMessage, ChatRole, MessageType };
use rllm::builder::{ LLMBackend, LLMBuilder };
use rllm::LLMProvider;

fn backend_for(llm_type: &LlmType) -> Result<LLMBackend, ProviderError> {
    match llm_type {
        LlmType::Ollama => Ok(LLMBackend::Ollama),
        LlmType::OpenAI => Ok(LLMBackend::OpenAI),
        LlmType::Anthropic => Ok(LLMBackend::Anthropic),
        LlmType::DeepSeek => Ok(LLMBackend::DeepSeek),
        LlmType::XAI => Ok(LLMBackend::XAI),
        LlmType::Groq => Ok(LLMBackend::Groq),
        LlmType::Gemini =>
            Err(ProviderError::Config("Gemini is served by GeminiChatClient".to_string())),
    }
}

fn default_model(llm_type: &LlmType) -> &'static str {
    match llm_type {
        LlmType::Ollama => "llama3.2",
        LlmType::OpenAI => "gpt-4o-mini",
        LlmType::Anthropic => "claude-3-5-haiku-latest",
        LlmType::DeepSeek => "deepseek-chat",
        LlmType::XAI => "grok-2-latest",
        LlmType::Groq => "llama-3.3-70b-versatile",
        LlmType::Gemini => super::gemini::DEFAULT_MODEL,
    }
}

/// Maps the conversation onto the chat roles the hosted backends use.
/// `model` turns become assistant messages.
fn to_messages(history: &[Turn], message: &str) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = history
        .iter()
        .map(|turn| ChatMessage {
            role: match turn.role() {
                Role::User => ChatRole::User,
                Role::Model => ChatRole::Assistant,
            },
            content: turn.text(),
            message_type: MessageType::Text,
        })
        .collect();
    messages.push(ChatMessage {
        role: ChatRole::User,
        content: message.to_string(),
        message_type: MessageType::Text,
    });
    messages
}

/// Chat client for every non-Gemini backend, built on `rllm`.
pub struct HostedChatClient {
    llm: Box<dyn LLMProvider>,
    llm_type: LlmType,
    model: String,
    base_url: Option<String>,
}

impl HostedChatClient {
    pub fn new(
        llm_type: LlmType,
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, ProviderError> {
        let backend = backend_for(&llm_type)?;
        let chat_model = model.unwrap_or_else(|| default_model(&llm_type).to_string());

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&chat_model)
            .stream(false);

        match api_key {
            Some(key) => {
                builder = builder.api_key(key);
            }
            None if llm_type != LlmType::Ollama => {
                return Err(
                    ProviderError::Config(format!("An API key is required for {}", llm_type))
                );
            }
            None => {}
        }
        if let Some(url) = &base_url {
            builder = builder.base_url(url);
        }

        let llm_provider = builder.build().map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self {
            llm: llm_provider,
            llm_type,
            model: chat_model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        Self::new(config.llm_type.clone(), api_key, config.model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for HostedChatClient {
    async fn send_message(
        &self,
        history: &[Turn],
        message: &str
    ) -> Result<String, ProviderError> {
        let messages = to_messages(history, message);
        info!(
            "HostedChatClient::send_message() → type={} model={} base_url={:?}",
            self.llm_type,
            self.model,
            self.base_url
        );
        let resp = self.llm
            .chat(&messages).await
            .map_err(|e| ProviderError::Backend(e.to_string()))?;
        let text = resp
            .text()
            .map(|s| s.to_string())
            .unwrap_or_else(|| resp.to_string());
        Ok(text)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
