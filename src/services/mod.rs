pub mod gemini;
mod memo_service;
mod summary_service;

pub use gemini::{GeminiProvider, ProviderError, SummaryProvider};
pub use memo_service::MemoService;
pub use summary_service::{
    MISSING_CONTENT_MESSAGE, MISSING_CREDENTIAL_MESSAGE, SummaryService, build_summary_prompt,
};
