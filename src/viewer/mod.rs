//! クライアント側のメモ表示と要約リクエスト

pub mod client;
pub mod display;
pub mod requestor;
pub mod state;

pub use client::{GatewayError, HttpMemoStore, HttpSummaryGateway, MemoSummaryStore, SummaryGateway};
pub use display::{CategoryBadge, MemoView, format_timestamp};
pub use requestor::{FALLBACK_ERROR_MESSAGE, SummarizeJob, SummaryRequestor};
pub use state::{DisplayedSummary, Outcome, Phase, Ticket, ViewerEvent, ViewerState};
