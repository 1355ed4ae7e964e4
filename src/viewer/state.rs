//! メモ表示の状態遷移（Idle / Summarizing / Error）
//!
//! 描画層を持たない純粋な遷移関数として実装している。
//! 非同期の要約処理は [`crate::viewer::requestor`] 側で行い、その結果を
//! [`ViewerEvent::Finished`] として戻す。

use chrono::{DateTime, Utc};

use crate::memo_models::{Memo, SummaryRequest};
use crate::viewer::requestor::SummarizeJob;

/// 表示中の要約。本文と更新日時は必ず一緒に差し替える
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedSummary {
    pub text: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DisplayedSummary {
    fn from_memo(memo: &Memo) -> Option<Self> {
        memo.summary.as_ref().map(|text| Self {
            text: text.clone(),
            updated_at: memo.summary_updated_at,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Summarizing,
    Error(String),
}

/// 1回の要約処理を識別する。メモの切り替えやキャンセルで世代が進む
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    memo_id: String,
    generation: u64,
}

impl Ticket {
    pub fn memo_id(&self) -> &str {
        &self.memo_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `saved` は保存先が返したレコード。返らなかった場合は None
    Generated {
        summary: String,
        saved: Option<Memo>,
        generated_at: DateTime<Utc>,
    },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    MemoOpened(Memo),
    Closed,
    SummarizeRequested,
    Finished { ticket: Ticket, outcome: Outcome },
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerState {
    memo: Option<Memo>,
    /// 最後に開いたメモのid。閉じても保持し、同じメモの再表示で実行中の結果を受け取る
    tracked_id: Option<String>,
    summary: Option<DisplayedSummary>,
    phase: Phase,
    generation: u64,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memo(&self) -> Option<&Memo> {
        self.memo.as_ref()
    }

    pub fn summary(&self) -> Option<&DisplayedSummary> {
        self.summary.as_ref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_summarizing(&self) -> bool {
        self.phase == Phase::Summarizing
    }

    /// 要約ボタンが押せるかどうか
    pub fn can_summarize(&self) -> bool {
        self.memo.is_some() && !self.is_summarizing()
    }

    fn current_ticket(&self) -> Option<Ticket> {
        self.tracked_id.as_ref().map(|memo_id| Ticket {
            memo_id: memo_id.clone(),
            generation: self.generation,
        })
    }

    fn clear_error(&mut self) {
        if matches!(self.phase, Phase::Error(_)) {
            self.phase = Phase::Idle;
        }
    }

    /// Summarizing へ遷移し、実行すべき処理を返す。
    /// ボタンが無効な状態（メモ未選択・処理中）では何もしない
    pub fn begin_summarize(self) -> (Self, Option<SummarizeJob>) {
        let job = self
            .memo
            .as_ref()
            .filter(|_| !self.is_summarizing())
            .map(|memo| {
                let ticket = Ticket {
                    memo_id: memo.id.clone(),
                    generation: self.generation,
                };
                SummarizeJob::new(ticket, SummaryRequest::for_memo(memo))
            });

        match job {
            Some(job) => (self.apply(ViewerEvent::SummarizeRequested), Some(job)),
            None => (self, None),
        }
    }

    pub fn apply(mut self, event: ViewerEvent) -> Self {
        match event {
            ViewerEvent::MemoOpened(memo) => {
                if self.tracked_id.as_deref() != Some(memo.id.as_str()) {
                    // 別のメモ: 実行中の要約は前のメモのもの
                    self.tracked_id = Some(memo.id.clone());
                    self.summary = DisplayedSummary::from_memo(&memo);
                    self.phase = Phase::Idle;
                    self.generation += 1;
                } else if self.needs_resync(&memo) {
                    self.summary = DisplayedSummary::from_memo(&memo);
                    self.clear_error();
                }
                self.memo = Some(memo);
            }
            ViewerEvent::Closed => {
                // 実行中の要約はキャンセルしない
                self.memo = None;
                self.summary = None;
                self.clear_error();
            }
            ViewerEvent::SummarizeRequested => {
                if self.can_summarize() {
                    self.phase = Phase::Summarizing;
                }
            }
            ViewerEvent::Finished { ticket, outcome } => {
                // 別のメモに切り替わった後やキャンセル後の結果は捨てる
                if self.current_ticket().as_ref() != Some(&ticket) {
                    tracing::debug!(memo_id = %ticket.memo_id, "dropping stale summary result");
                    return self;
                }
                if self.memo.is_none() {
                    // 閉じている間に届いた結果。次に開いたとき保存先から読み直す
                    self.phase = Phase::Idle;
                    return self;
                }
                match outcome {
                    Outcome::Generated {
                        summary,
                        saved,
                        generated_at,
                    } => {
                        self.summary = Some(match saved {
                            Some(record) => {
                                let shown = DisplayedSummary {
                                    text: record.summary.clone().unwrap_or(summary),
                                    updated_at: Some(
                                        record.summary_updated_at.unwrap_or(generated_at),
                                    ),
                                };
                                // 保存済みレコードを追跡し、再表示時に読み直さないようにする
                                self.memo = Some(record);
                                shown
                            }
                            None => DisplayedSummary {
                                text: summary,
                                updated_at: Some(generated_at),
                            },
                        });
                        self.phase = Phase::Idle;
                    }
                    Outcome::Failed(message) => {
                        self.phase = Phase::Error(message);
                    }
                }
            }
            ViewerEvent::Cancel => {
                self.generation += 1;
                if self.is_summarizing() {
                    self.phase = Phase::Idle;
                }
            }
        }
        self
    }

    /// 保存済み要約か要約日時が変わったとき（または閉じた後の再表示）だけ表示を読み直す
    fn needs_resync(&self, incoming: &Memo) -> bool {
        match &self.memo {
            None => true,
            Some(current) => {
                current.summary != incoming.summary
                    || current.summary_updated_at != incoming.summary_updated_at
            }
        }
    }
}
