pub mod http;
mod noop;

pub use http::HttpParaphraser;
pub use noop::NoopRewriter;

use async_trait::async_trait;

use crate::domain::error::{AppError, ErrorCode};
use crate::domain::types::{Dialect, Tone};

/// リライトエラー
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("Rewriter not available: {0}")]
    NotAvailable(String),
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("Rewrite service error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Rewrite timeout")]
    Timeout,
}

impl RewriteError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotAvailable(_) => ErrorCode::Rewrite,
            Self::Transport(_) | Self::Status { .. } => ErrorCode::Network,
            Self::MalformedResponse(_) => ErrorCode::MalformedResponse,
            Self::Timeout => ErrorCode::Timeout,
        }
    }
}

impl From<RewriteError> for AppError {
    fn from(e: RewriteError) -> Self {
        AppError::rewrite(e.code(), e.to_string())
    }
}

/// リライトコンテキスト（呼び出し時点の値で固定される）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteContext {
    pub tone: Tone,
    /// 送信はされないがログとテスト用に保持する
    pub dialect: Dialect,
}

/// リライター trait（外部の言い換えサービスを抽象化）
#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(
        &self,
        text: &str,
        ctx: RewriteContext,
    ) -> Result<String, RewriteError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
pub(crate) mod testing;
