use std::sync::Arc;
use std::time::Instant;

use crate::domain::session::SessionHandle;
use crate::domain::types::{Dialect, OrderingPolicy, Tone};
use crate::infra::metrics::Metrics;
use crate::infra::rewriter::{RewriteContext, RewriteError, Rewriter};

/// request_rewrite の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// 入力が空なのでリクエストしなかった
    Skipped,
    /// 結果をセッションに反映した
    Applied(String),
    /// 新しいリクエストの結果が反映済みだったため捨てた（IssueOrder のみ）
    Discarded(String),
}

/// リライトオーケストレーター
///
/// リクエストはキャンセルしない。ArrivalOrder では後に届いた応答が
/// 発行順に関係なく result を上書きする。
pub struct RewriteOrchestrator {
    session: SessionHandle,
    rewriter: Arc<dyn Rewriter>,
    metrics: Arc<Metrics>,
    ordering: OrderingPolicy,
}

/// 発行済みで応答待ちのリクエスト
///
/// drop されると（タスク中断を含む）in-flight から外れる。
pub struct PendingRewrite {
    seq: u64,
    ctx: RewriteContext,
    text: String,
    _guard: InFlightGuard,
}

/// drop 時に必ずリクエスト終了を記録する
struct InFlightGuard {
    session: SessionHandle,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.session.update(|s| s.finish_request());
    }
}

impl RewriteOrchestrator {
    pub fn new(
        session: SessionHandle,
        rewriter: Arc<dyn Rewriter>,
        metrics: Arc<Metrics>,
        ordering: OrderingPolicy,
    ) -> Self {
        Self {
            session,
            rewriter,
            metrics,
            ordering,
        }
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    pub fn rewriter_name(&self) -> &str {
        self.rewriter.name()
    }

    /// tone / dialect / text は呼び出し時点の値を使う
    pub async fn request_rewrite(
        &self,
        tone: Tone,
        dialect: Dialect,
        text: &str,
    ) -> Result<RewriteOutcome, RewriteError> {
        match self.begin(tone, dialect, text) {
            Some(pending) => self.complete(pending).await,
            None => Ok(RewriteOutcome::Skipped),
        }
    }

    /// リクエストを開始する（同期）。戻った時点で busy は true になっている。
    ///
    /// 入力が空なら None を返し、何も発行しない。
    pub fn begin(&self, tone: Tone, dialect: Dialect, text: &str) -> Option<PendingRewrite> {
        if text.is_empty() {
            log::debug!("空入力のためリライトをスキップ");
            self.metrics.inc_rewrites_skipped();
            return None;
        }

        let seq = self.session.update(|s| s.begin_request());
        let guard = InFlightGuard {
            session: self.session.clone(),
        };
        self.metrics.inc_rewrites_issued();
        log::info!(
            "リライト要求 #{seq}: tone={tone} dialect={} ({} 文字)",
            dialect.as_str(),
            text.chars().count()
        );

        Some(PendingRewrite {
            seq,
            ctx: RewriteContext { tone, dialect },
            text: text.to_string(),
            _guard: guard,
        })
    }

    /// 開始済みリクエストをリライターに送り、結果を反映する
    pub async fn complete(&self, pending: PendingRewrite) -> Result<RewriteOutcome, RewriteError> {
        let PendingRewrite {
            seq,
            ctx,
            text,
            _guard,
        } = pending;
        let tone = ctx.tone;

        let start = Instant::now();
        let result = self.rewriter.rewrite(&text, ctx).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(rewritten) => {
                self.metrics.record_latency(tone.as_str(), elapsed_ms, true);
                let ordering = self.ordering;
                let applied = self.session.update(|s| {
                    if s.accept_response(seq, ordering) {
                        s.set_result(rewritten.clone());
                        true
                    } else {
                        false
                    }
                });

                if applied {
                    self.metrics.inc_rewrites_applied();
                    log::info!("リライト完了 #{seq}: {elapsed_ms}ms");
                    Ok(RewriteOutcome::Applied(rewritten))
                } else {
                    self.metrics.inc_rewrites_discarded();
                    log::info!("リライト結果 #{seq} は古いため破棄");
                    Ok(RewriteOutcome::Discarded(rewritten))
                }
            }
            Err(e) => {
                self.metrics.record_latency(tone.as_str(), elapsed_ms, false);
                self.metrics.inc_error(e.code());
                log::error!("リライト失敗 #{seq}: {e}");
                Err(e)
            }
        }
    }
}
