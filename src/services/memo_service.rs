use crate::{
    error::{AppError, Result},
    memo_models::Memo,
    repositories::MemoRepository,
};
use chrono::Utc;
use std::sync::Arc;

pub struct MemoService {
    memo_repo: Arc<dyn MemoRepository>,
}

impl MemoService {
    pub fn new(memo_repo: Arc<dyn MemoRepository>) -> Self {
        Self { memo_repo }
    }

    pub async fn find_by_id(&self, memo_id: &str) -> Result<Memo> {
        self.memo_repo
            .find_by_id(memo_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Memo {} not found", memo_id)))
    }

    /// 要約と要約更新日時は必ず同時に書き込む
    pub async fn save_summary(&self, memo_id: &str, summary: String) -> Result<Memo> {
        validate_summary(&summary)?;

        let mut memo = self.find_by_id(memo_id).await?;
        memo.summary = Some(summary);
        memo.summary_updated_at = Some(Utc::now());

        self.memo_repo.update(memo).await
    }
}

fn validate_summary(summary: &str) -> Result<()> {
    if summary.trim().is_empty() {
        return Err(AppError::ValidationError("Summary cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo_models::Category;
    use crate::repositories::InMemoryMemoRepository;
    use chrono::TimeZone;

    async fn service_with(memo_id: &str) -> MemoService {
        let repo = InMemoryMemoRepository::new();
        let at = Utc.with_ymd_and_hms(2026, 9, 30, 12, 0, 0).unwrap();
        repo.insert(Memo {
            id: memo_id.to_string(),
            title: "読書メモ".into(),
            content: "第3章まで".into(),
            category: Category::Study,
            tags: vec!["book".into()],
            created_at: at,
            updated_at: at,
            summary: None,
            summary_updated_at: None,
        })
        .await
        .unwrap();
        MemoService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn save_summary_sets_text_and_timestamp_together() {
        let service = service_with("m1").await;
        let before = Utc::now();

        let memo = service.save_summary("m1", "- 要点".into()).await.unwrap();
        assert_eq!(memo.summary.as_deref(), Some("- 要点"));
        assert!(memo.summary_updated_at.unwrap() >= before);

        let stored = service.find_by_id("m1").await.unwrap();
        assert_eq!(stored, memo);
    }

    #[tokio::test]
    async fn save_summary_for_unknown_memo_is_not_found() {
        let service = service_with("m1").await;
        let err = service.save_summary("nope", "x".into()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_summary_is_rejected() {
        let service = service_with("m1").await;
        let err = service.save_summary("m1", " ".into()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
