use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use log::{ info, warn };

use super::{ ChatClient, ProviderError };
use crate::llm::LlmConfig;
use crate::models::chat::Turn;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// Finish reasons that mean the candidate text must not be shown.
const BAD_FINISH_REASONS: [&str; 3] = ["SAFETY", "RECITATION", "LANGUAGE"];

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<&'a Turn>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleCandidate {
    content: Option<GoogleContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize)]
struct GooglePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let candidate = match response.candidates.into_iter().next() {
        Some(c) => c,
        None => {
            let reason = response.prompt_feedback.and_then(|f| f.block_reason);
            return match reason {
                Some(reason) => Err(ProviderError::Blocked(reason)),
                None => Err(ProviderError::EmptyResponse),
            };
        }
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BAD_FINISH_REASONS.contains(&reason) {
            return Err(ProviderError::Blocked(reason.to_string()));
        }
    }

    let content = candidate.content.ok_or(ProviderError::EmptyResponse)?;
    Ok(
        content.parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect()
    )
}

/// Talks to the Gemini `generateContent` REST endpoint directly so that
/// `model` turns reach the provider with their native role.
pub struct GeminiChatClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            http: HttpClient::new(),
            api_key,
            model: chat_model,
            base_url: url,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::Config("Google API key is required for GeminiChatClient".to_string())
            })?;

        Ok(Self::new(api_key, config.model.clone(), config.base_url.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn send_message(
        &self,
        history: &[Turn],
        message: &str
    ) -> Result<String, ProviderError> {
        let next = Turn::user(message);
        let mut contents: Vec<&Turn> = history.iter().collect();
        contents.push(&next);
        let payload = GenerateContentRequest { contents };

        info!(
            "GeminiChatClient::send_message() → model={} history_turns={}",
            self.model,
            history.len()
        );

        let resp = self.http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Gemini returned {} for model {}", status, self.model);
            return Err(ProviderError::Status { status, body });
        }

        let data = resp.json::<GenerateContentResponse>().await?;
        extract_text(data)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
