use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::memo_models::Memo;

#[async_trait]
pub trait MemoRepository: Send + Sync {
    async fn find_by_id(&self, memo_id: &str) -> Result<Option<Memo>>;
    async fn insert(&self, memo: Memo) -> Result<Memo>;
    async fn update(&self, memo: Memo) -> Result<Memo>;
}

/// インメモリストレージ
/// memo_id -> Memo
#[derive(Default)]
pub struct InMemoryMemoRepository {
    memos: Arc<DashMap<String, Memo>>,
}

impl InMemoryMemoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON配列のファイルから初期データを読み込む
    pub fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read memo seed file {}", path.display()))?;
        let memos: Vec<Memo> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse memo seed file {}", path.display()))?;

        let repo = Self::new();
        for memo in memos {
            repo.memos.insert(memo.id.clone(), memo);
        }
        tracing::info!(count = repo.len(), "memo seed loaded");
        Ok(repo)
    }

    pub fn len(&self) -> usize {
        self.memos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memos.is_empty()
    }
}

#[async_trait]
impl MemoRepository for InMemoryMemoRepository {
    async fn find_by_id(&self, memo_id: &str) -> Result<Option<Memo>> {
        Ok(self.memos.get(memo_id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, memo: Memo) -> Result<Memo> {
        if memo.id.trim().is_empty() {
            return Err(AppError::ValidationError("Memo id cannot be empty".into()));
        }
        self.memos.insert(memo.id.clone(), memo.clone());
        Ok(memo)
    }

    async fn update(&self, memo: Memo) -> Result<Memo> {
        match self.memos.get_mut(&memo.id) {
            Some(mut entry) => {
                *entry = memo.clone();
                Ok(memo)
            }
            None => Err(AppError::NotFound(format!("Memo {} not found", memo.id))),
        }
    }
}
