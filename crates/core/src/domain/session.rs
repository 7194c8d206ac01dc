use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use super::types::{Dialect, OrderingPolicy, Tone};

/// リライト呼び出しの状態（Idle → Requesting → Idle）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Requesting,
}

impl SessionState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
        }
    }
}

/// 1ビュー分の編集セッション（永続化しない）
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub created_at: String,
    text: String,
    tone: Tone,
    dialect: Dialect,
    result: String,
    busy: bool,
    in_flight: usize,
    last_issued_seq: u64,
    last_applied_seq: u64,
}

impl Session {
    pub fn new(session_id: String, tone: Tone, now: String) -> Self {
        Self {
            session_id,
            created_at: now,
            text: String::new(),
            tone,
            dialect: Dialect::British,
            result: String::new(),
            busy: false,
            in_flight: 0,
            last_issued_seq: 0,
            last_applied_seq: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn state(&self) -> SessionState {
        if self.busy {
            SessionState::Requesting
        } else {
            SessionState::Idle
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    pub fn set_result(&mut self, result: impl Into<String>) {
        self.result = result.into();
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// text と result を空にする。tone / busy は変えない
    pub fn clear(&mut self) {
        self.text.clear();
        self.result.clear();
    }

    /// リクエスト発行を記録し、シーケンス番号を返す
    pub fn begin_request(&mut self) -> u64 {
        self.in_flight += 1;
        self.last_issued_seq += 1;
        self.set_busy(true);
        self.last_issued_seq
    }

    /// リクエスト終了を記録する。全リクエストが終わった時点で busy を下ろす
    pub fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.set_busy(false);
        }
    }

    /// seq の結果を反映してよいか判定し、よければ適用済みとして記録する
    pub fn accept_response(&mut self, seq: u64, policy: OrderingPolicy) -> bool {
        match policy {
            OrderingPolicy::ArrivalOrder => {
                self.last_applied_seq = self.last_applied_seq.max(seq);
                true
            }
            OrderingPolicy::IssueOrder => {
                if seq < self.last_applied_seq {
                    false
                } else {
                    self.last_applied_seq = seq;
                    true
                }
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            text: self.text.clone(),
            tone: self.tone,
            dialect: self.dialect,
            result: self.result.clone(),
            busy: self.busy,
        }
    }
}

/// レンダラーに渡す読み取り専用ビュー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub text: String,
    pub tone: Tone,
    pub dialect: Dialect,
    pub result: String,
    pub busy: bool,
}

/// 共有セッション。変更のたびにスナップショットを watch チャネルへ流す
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        let (tx, _rx) = watch::channel(session.snapshot());
        Self {
            inner: Arc::new(Mutex::new(session)),
            tx: Arc::new(tx),
        }
    }

    /// 現在値と以降の変更を受け取る
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.inner.lock())
    }

    /// セッションを変更し、差分があれば通知する
    pub fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.inner.lock();
        let out = f(&mut session);
        let snapshot = session.snapshot();
        // ロック中に送ることで通知順を変更順に揃える
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        out
    }
}
