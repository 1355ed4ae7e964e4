use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// メモのカテゴリ。未知の値は `Other` として扱う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Work,
    Study,
    Idea,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // AI要約
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub summary_updated_at: Option<DateTime<Utc>>,
}

// AI Summarization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl SummaryRequest {
    pub fn for_memo(memo: &Memo) -> Self {
        Self {
            title: Some(memo.title.clone()),
            content: Some(memo.content.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSummaryRequest {
    pub summary: String,
}
