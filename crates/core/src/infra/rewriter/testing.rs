use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{RewriteContext, RewriteError, Rewriter};

type Reply = Result<String, RewriteError>;

/// テスト用リライター。入力テキストごとに応答タイミングを制御できる
#[derive(Default)]
pub(crate) struct GatedRewriter {
    calls: Mutex<Vec<(String, RewriteContext)>>,
    receivers: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    senders: Mutex<HashMap<String, oneshot::Sender<Reply>>>,
}

impl GatedRewriter {
    /// text への応答を保留状態で用意する
    pub fn gate(&self, text: &str) {
        let (tx, rx) = oneshot::channel();
        self.senders.lock().insert(text.to_string(), tx);
        self.receivers.lock().insert(text.to_string(), rx);
    }

    /// 保留中の応答を返す
    pub fn release(&self, text: &str, reply: Reply) {
        if let Some(tx) = self.senders.lock().remove(text) {
            let _ = tx.send(reply);
        }
    }

    pub fn respond_now(&self, text: &str, reply: Reply) {
        self.gate(text);
        self.release(text, reply);
    }

    pub fn calls(&self) -> Vec<(String, RewriteContext)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Rewriter for GatedRewriter {
    async fn rewrite(&self, text: &str, ctx: RewriteContext) -> Result<String, RewriteError> {
        self.calls.lock().push((text.to_string(), ctx));
        let rx = self.receivers.lock().remove(text);
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(RewriteError::Transport("gate dropped".to_string()))),
            None => Err(RewriteError::NotAvailable(format!("no reply for {text}"))),
        }
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// spawn 済みタスクが n 件リクエスト中になるまで譲る
pub(crate) async fn wait_for_in_flight(session: &crate::domain::session::SessionHandle, n: usize) {
    for _ in 0..100 {
        if session.read(|s| s.in_flight()) == n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {n} requests in flight");
}
