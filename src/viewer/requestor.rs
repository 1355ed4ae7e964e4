use chrono::{TimeZone, Utc};
use std::fmt::Display;

use crate::memo_models::{Memo, SummaryRequest};
use crate::viewer::client::{MemoSummaryStore, SummaryGateway};
use crate::viewer::display::MemoView;
use crate::viewer::state::{Outcome, Ticket, ViewerEvent, ViewerState};

/// サーバーがエラーメッセージを返さなかったときの表示
pub const FALLBACK_ERROR_MESSAGE: &str = "要約の生成に失敗しました。もう一度お試しください。";

/// 1回分の要約処理。状態とは切り離されているので、実行中にメモを
/// 切り替えても結果はチケットで照合される
#[derive(Debug, Clone)]
pub struct SummarizeJob {
    ticket: Ticket,
    request: SummaryRequest,
}

impl SummarizeJob {
    pub(crate) fn new(ticket: Ticket, request: SummaryRequest) -> Self {
        Self { ticket, request }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn request(&self) -> &SummaryRequest {
        &self.request
    }

    /// 要約APIを呼び、成功した場合のみ保存する（順番に実行）
    pub async fn run<G, S>(self, gateway: &G, store: &S) -> ViewerEvent
    where
        G: SummaryGateway + ?Sized,
        S: MemoSummaryStore + ?Sized,
    {
        let memo_id = self.ticket.memo_id().to_string();

        let summary = match gateway.request_summary(&self.request).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(memo_id = %memo_id, error = %e, "summary request failed");
                let message = e
                    .server_message()
                    .unwrap_or(FALLBACK_ERROR_MESSAGE)
                    .to_string();
                return ViewerEvent::Finished {
                    ticket: self.ticket,
                    outcome: Outcome::Failed(message),
                };
            }
        };

        let saved = match store.save_memo_summary(&memo_id, &summary).await {
            Ok(Some(memo)) => Some(memo),
            Ok(None) => {
                tracing::warn!(memo_id = %memo_id, "summary was not persisted; showing local copy");
                None
            }
            Err(e) => {
                tracing::warn!(memo_id = %memo_id, error = %e, "failed to persist summary; showing local copy");
                None
            }
        };

        ViewerEvent::Finished {
            ticket: self.ticket,
            outcome: Outcome::Generated {
                summary,
                saved,
                generated_at: Utc::now(),
            },
        }
    }
}

/// メモ表示と要約処理をまとめたもの
pub struct SummaryRequestor<G, S> {
    gateway: G,
    store: S,
    state: ViewerState,
}

impl<G, S> SummaryRequestor<G, S>
where
    G: SummaryGateway,
    S: MemoSummaryStore,
{
    pub fn new(gateway: G, store: S) -> Self {
        Self {
            gateway,
            store,
            state: ViewerState::new(),
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn open(&mut self, memo: Memo) {
        self.dispatch(ViewerEvent::MemoOpened(memo));
    }

    pub fn close(&mut self) {
        self.dispatch(ViewerEvent::Closed);
    }

    pub fn dispatch(&mut self, event: ViewerEvent) {
        self.state = std::mem::take(&mut self.state).apply(event);
    }

    /// 要約を1サイクル実行する。開始できなかった場合は false
    pub async fn summarize(&mut self) -> bool {
        let (state, job) = std::mem::take(&mut self.state).begin_summarize();
        self.state = state;

        let Some(job) = job else {
            return false;
        };

        let event = job.run(&self.gateway, &self.store).await;
        self.dispatch(event);
        true
    }

    pub fn view<Tz>(&self, tz: &Tz) -> Option<MemoView>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        MemoView::from_state(&self.state, tz)
    }
}
