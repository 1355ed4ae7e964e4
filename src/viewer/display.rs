use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

use crate::memo_models::Category;
use crate::viewer::state::ViewerState;

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M";

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Personal => "個人",
            Category::Work => "仕事",
            Category::Study => "学習",
            Category::Idea => "アイデア",
            Category::Other => "その他",
        }
    }

    pub fn color_code(&self) -> &'static str {
        match self {
            Category::Personal => "#3B82F6",
            Category::Work => "#10B981",
            Category::Study => "#8B5CF6",
            Category::Idea => "#F59E0B",
            Category::Other => "#6B7280",
        }
    }
}

pub fn format_timestamp<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBadge {
    pub label: &'static str,
    pub color_code: &'static str,
}

impl From<Category> for CategoryBadge {
    fn from(category: Category) -> Self {
        Self {
            label: category.label(),
            color_code: category.color_code(),
        }
    }
}

/// 描画層に渡す表示用データ
#[derive(Debug, Clone, PartialEq)]
pub struct MemoView {
    pub title: String,
    pub content: String,
    pub category: CategoryBadge,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub summary: Option<String>,
    pub summary_updated_at: Option<String>,
    pub error: Option<String>,
    pub summarizing: bool,
    pub can_summarize: bool,
    pub summarize_label: &'static str,
}

impl MemoView {
    pub fn from_state<Tz>(state: &ViewerState, tz: &Tz) -> Option<Self>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let memo = state.memo()?;
        let summary = state.summary();

        let summarize_label = if state.is_summarizing() {
            "要約中..."
        } else if summary.is_some() {
            "要約を再生成"
        } else {
            "AIで要約"
        };

        Some(Self {
            title: memo.title.clone(),
            content: memo.content.clone(),
            category: memo.category.into(),
            tags: memo.tags.iter().map(|tag| format!("#{}", tag)).collect(),
            created_at: format_timestamp(&memo.created_at, tz),
            updated_at: format_timestamp(&memo.updated_at, tz),
            summary: summary.map(|s| s.text.clone()),
            summary_updated_at: summary
                .and_then(|s| s.updated_at.as_ref())
                .map(|ts| format_timestamp(ts, tz)),
            error: state.error().map(str::to_string),
            summarizing: state.is_summarizing(),
            can_summarize: state.can_summarize(),
            summarize_label,
        })
    }
}
