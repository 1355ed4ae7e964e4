use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::GeminiConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to send request: {0}")]
    Http(String),

    #[error("Gemini API error: status={status}, body={body}")]
    Status { status: u16, body: String },

    #[error("Gemini API error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Gemini API returned no text")]
    EmptyResponse,
}

// URLはログに残さない
impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        ProviderError::Http(error.without_url().to_string())
    }
}

/// 生成AIへの窓口。テストではスタブに差し替える
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, ProviderError>;
}

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(config.base_url.clone(), config.model.clone())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl SummaryProvider for GeminiProvider {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }]
            }))
            .send()
            .await?;

        // ステータスコードチェック
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.without_url().to_string()))?;

        extract_text(&body)
    }
}

/// candidates[0].content.parts の最初のテキストを取り出す
pub fn extract_text(body: &Value) -> Result<String, ProviderError> {
    if let Some(error) = body.get("error") {
        let message = error["message"].as_str().unwrap_or("Unknown error");
        return Err(ProviderError::Api(message.to_string()));
    }

    body["candidates"][0]["content"]["parts"]
        .as_array()
        .and_then(|parts| parts.iter().find_map(|part| part["text"].as_str()))
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or(ProviderError::EmptyResponse)
}
