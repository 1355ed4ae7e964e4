use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    memo_models::{SummaryRequest, SummaryResponse},
    services::gemini::SummaryProvider,
};

pub const MISSING_CREDENTIAL_MESSAGE: &str = "GEMINI_API_KEY is not defined";
pub const MISSING_CONTENT_MESSAGE: &str = "Content is required";

pub struct SummaryService {
    api_key: Option<String>,
    provider: Arc<dyn SummaryProvider>,
}

impl SummaryService {
    /// 空文字のAPIキーは未設定として扱う
    pub fn new(api_key: Option<String>, provider: Arc<dyn SummaryProvider>) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        Self { api_key, provider }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// 生のリクエストボディから要約する
    /// APIキーの確認はボディの解析より先に行う
    pub async fn summarize_body(&self, body: &[u8]) -> Result<SummaryResponse> {
        let api_key = self.credential()?;
        let req: SummaryRequest = serde_json::from_slice(body)
            .map_err(|e| AppError::SummaryFailed(format!("Invalid request body: {}", e)))?;
        self.summarize_with_key(api_key, req).await
    }

    fn credential(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::ConfigError(MISSING_CREDENTIAL_MESSAGE.to_string()))
    }

    async fn summarize_with_key(&self, api_key: &str, req: SummaryRequest) -> Result<SummaryResponse> {
        let content = match req.content.as_deref() {
            Some(content) if !content.is_empty() => content,
            _ => return Err(AppError::ValidationError(MISSING_CONTENT_MESSAGE.to_string())),
        };
        let title = req.title.as_deref().unwrap_or_default();

        let prompt = build_summary_prompt(title, content);
        tracing::debug!(
            title_len = title.len(),
            content_len = content.len(),
            "requesting memo summary"
        );

        let summary = self
            .provider
            .generate(api_key, &prompt)
            .await
            .map_err(|e| AppError::SummaryFailed(e.to_string()))?;

        Ok(SummaryResponse { summary })
    }
}

/// 要約用のプロンプト。タイトルと本文はそのまま埋め込む
pub fn build_summary_prompt(title: &str, content: &str) -> String {
    format!(
        "以下のメモの内容を3〜5行で要約してください。\n\
         重要なポイントを押さえ、Markdown形式で出力してください。\n\n\
         [タイトル]\n{}\n\n[内容]\n{}",
        title, content
    )
}
