use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::session::{Session, SessionHandle, SessionSnapshot, SessionState};
use crate::domain::settings::PhraserSettings;
use crate::domain::types::{clamp_input, Dialect, OrderingPolicy, Tone};
use crate::infra::metrics::{Metrics, MetricsSummary};
use crate::infra::output::OutputRouter;
use crate::infra::rewriter::{RewriteError, Rewriter};
use crate::usecase::orchestrator::{RewriteOrchestrator, RewriteOutcome};

/// アプリケーションサービス。レンダラーからのトリガーをここで受ける
///
/// `on_*` はリライトを tokio タスクとして投げっぱなしにする（tokio ランタイム上で呼ぶこと）。
/// `*_and_wait` は同じ処理を待って結果を返す。
pub struct PhraserService {
    session: SessionHandle,
    orchestrator: Arc<RewriteOrchestrator>,
    output_router: OutputRouter,
    metrics: Arc<Metrics>,
}

/// リライト引数（トリガー時点で確定）
struct RewriteArgs {
    tone: Tone,
    dialect: Dialect,
    text: String,
}

impl PhraserService {
    pub fn new(
        settings: &PhraserSettings,
        rewriter: Arc<dyn Rewriter>,
        output_router: OutputRouter,
    ) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let session = SessionHandle::new(Session::new(session_id, settings.default_tone, now));
        let metrics = Arc::new(Metrics::new());
        let orchestrator = Arc::new(RewriteOrchestrator::new(
            session.clone(),
            rewriter,
            metrics.clone(),
            settings.ordering,
        ));

        log::info!(
            "セッション開始: rewriter={} ordering={:?}",
            orchestrator.rewriter_name(),
            settings.ordering
        );

        Self {
            session,
            orchestrator,
            output_router,
            metrics,
        }
    }

    // ==================== Triggers ====================

    /// キー入力: テキストだけ更新し、リライトはしない
    pub fn on_text_edit(&self, value: &str) {
        let value = clamp_input(value);
        self.session.update(|s| s.set_text(value));
    }

    /// 貼り付け: テキストを置き換え、現在のトーンでリライト
    ///
    /// 戻った時点で busy は立っている。空の貼り付けは None
    pub fn on_paste(&self, value: &str) -> Option<JoinHandle<()>> {
        let args = self.prepare_paste(value);
        self.spawn_rewrite(args)
    }

    pub async fn on_paste_and_wait(&self, value: &str) -> Result<RewriteOutcome, RewriteError> {
        let args = self.prepare_paste(value);
        self.run(args).await
    }

    /// トーン選択: 選んだトーンと現在のテキストでリライト
    pub fn on_tone_selected(&self, tone: Tone) -> Option<JoinHandle<()>> {
        let args = self.prepare_tone(tone);
        self.spawn_rewrite(args)
    }

    pub async fn on_tone_selected_and_wait(
        &self,
        tone: Tone,
    ) -> Result<RewriteOutcome, RewriteError> {
        let args = self.prepare_tone(tone);
        self.run(args).await
    }

    /// 「Paraphrase」押下。テキストが空なら何もしない
    pub fn on_submit(&self) -> Option<JoinHandle<()>> {
        self.prepare_submit().and_then(|args| self.spawn_rewrite(args))
    }

    pub async fn on_submit_and_wait(&self) -> Result<RewriteOutcome, RewriteError> {
        match self.prepare_submit() {
            Some(args) => self.run(args).await,
            None => Ok(RewriteOutcome::Skipped),
        }
    }

    /// 「Clear All」: 実行中のリクエストはキャンセルしない
    pub fn on_clear(&self) {
        self.session.update(|s| s.clear());
        log::debug!("セッションをクリア");
    }

    /// 結果をクリップボードへ。空なら何もしない。失敗はログのみ
    pub fn copy_result(&self) -> bool {
        let result = self.session.read(|s| s.result().to_string());
        match self.output_router.deliver_if_present(&result) {
            Ok(delivered) => {
                if delivered {
                    self.metrics.inc_copies();
                }
                delivered
            }
            Err(e) => {
                self.metrics.inc_error(e.code);
                log::warn!("コピー失敗 [{}]: {e}", self.output_router.target_name());
                false
            }
        }
    }

    // ==================== Queries ====================

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.session.subscribe()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.read(|s| s.state())
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.orchestrator.ordering()
    }

    /// セッション開始時刻（RFC 3339）
    pub fn started_at(&self) -> String {
        self.session.read(|s| s.created_at.clone())
    }

    pub fn get_metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    // ==================== Internals ====================

    fn prepare_paste(&self, value: &str) -> RewriteArgs {
        let text = clamp_input(value);
        self.session.update(|s| {
            s.set_text(text.clone());
            RewriteArgs {
                tone: s.tone(),
                dialect: s.dialect(),
                text,
            }
        })
    }

    fn prepare_tone(&self, tone: Tone) -> RewriteArgs {
        self.session.update(|s| {
            s.set_tone(tone);
            RewriteArgs {
                tone,
                dialect: s.dialect(),
                text: s.text().to_string(),
            }
        })
    }

    fn prepare_submit(&self) -> Option<RewriteArgs> {
        self.session.read(|s| {
            if s.text().is_empty() {
                None
            } else {
                Some(RewriteArgs {
                    tone: s.tone(),
                    dialect: s.dialect(),
                    text: s.text().to_string(),
                })
            }
        })
    }

    async fn run(&self, args: RewriteArgs) -> Result<RewriteOutcome, RewriteError> {
        self.orchestrator
            .request_rewrite(args.tone, args.dialect, &args.text)
            .await
    }

    /// busy を立ててから応答待ちだけをタスクに渡す
    fn spawn_rewrite(&self, args: RewriteArgs) -> Option<JoinHandle<()>> {
        let pending = self
            .orchestrator
            .begin(args.tone, args.dialect, &args.text)?;
        let orchestrator = self.orchestrator.clone();
        Some(tokio::spawn(async move {
            // 失敗はオーケストレーター側でログ済み
            let _ = orchestrator.complete(pending).await;
        }))
    }
}
