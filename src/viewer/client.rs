use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::error::AppError;
use crate::memo_models::{Memo, SaveSummaryRequest, SummaryRequest};
use crate::services::MemoService;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("summarize endpoint rejected the request (status {status}): {message:?}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("summarize request failed: {0}")]
    Transport(String),
}

impl GatewayError {
    /// レスポンスボディの error フィールド
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected { message, .. } => message.as_deref(),
            GatewayError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::Transport(error.to_string())
    }
}

#[async_trait]
pub trait SummaryGateway: Send + Sync {
    async fn request_summary(&self, req: &SummaryRequest) -> Result<String, GatewayError>;
}

/// 要約の保存先。レコードが返らない場合は Ok(None)
#[async_trait]
pub trait MemoSummaryStore: Send + Sync {
    async fn save_memo_summary(&self, memo_id: &str, summary: &str) -> anyhow::Result<Option<Memo>>;
}

#[async_trait]
impl<T: SummaryGateway + ?Sized> SummaryGateway for Arc<T> {
    async fn request_summary(&self, req: &SummaryRequest) -> Result<String, GatewayError> {
        (**self).request_summary(req).await
    }
}

#[async_trait]
impl<T: MemoSummaryStore + ?Sized> MemoSummaryStore for Arc<T> {
    async fn save_memo_summary(&self, memo_id: &str, summary: &str) -> anyhow::Result<Option<Memo>> {
        (**self).save_memo_summary(memo_id, summary).await
    }
}

/// POST {base_url}/api/summarize
pub struct HttpSummaryGateway {
    client: Client,
    base_url: String,
}

impl HttpSummaryGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/summarize", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SummaryGateway for HttpSummaryGateway {
    async fn request_summary(&self, req: &SummaryRequest) -> Result<String, GatewayError> {
        let response = self.client.post(self.endpoint()).json(req).send().await?;
        let status = response.status();

        // エラー時のボディはJSONとは限らない
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);

        if !status.is_success() || message.is_some() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        body.get("summary")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Transport("response has no summary field".to_string()))
    }
}

/// PATCH {base_url}/api/memos/{id}/summary
pub struct HttpMemoStore {
    client: Client,
    base_url: String,
}

impl HttpMemoStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, memo_id: &str) -> String {
        format!(
            "{}/api/memos/{}/summary",
            self.base_url.trim_end_matches('/'),
            memo_id
        )
    }
}

#[async_trait]
impl MemoSummaryStore for HttpMemoStore {
    async fn save_memo_summary(&self, memo_id: &str, summary: &str) -> anyhow::Result<Option<Memo>> {
        let response = self
            .client
            .patch(self.endpoint(memo_id))
            .json(&SaveSummaryRequest {
                summary: summary.to_string(),
            })
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("saving summary failed: status={}, body={}", status, body)
            }
        }
    }
}

#[async_trait]
impl MemoSummaryStore for MemoService {
    async fn save_memo_summary(&self, memo_id: &str, summary: &str) -> anyhow::Result<Option<Memo>> {
        match self.save_summary(memo_id, summary.to_string()).await {
            Ok(memo) => Ok(Some(memo)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_only_for_rejections() {
        let rejected = GatewayError::Rejected {
            status: 500,
            message: Some("boom".into()),
        };
        assert_eq!(rejected.server_message(), Some("boom"));

        let silent = GatewayError::Rejected {
            status: 502,
            message: None,
        };
        assert_eq!(silent.server_message(), None);

        let transport = GatewayError::Transport("connection refused".into());
        assert_eq!(transport.server_message(), None);
    }

    #[test]
    fn endpoints_tolerate_trailing_slash() {
        let gateway = HttpSummaryGateway::new("http://localhost:5050/");
        assert_eq!(gateway.endpoint(), "http://localhost:5050/api/summarize");

        let store = HttpMemoStore::new("http://localhost:5050");
        assert_eq!(
            store.endpoint("m1"),
            "http://localhost:5050/api/memos/m1/summary"
        );
    }
}
