use serde::Serialize;

/// アプリケーション共通エラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_NETWORK")]
    Network,
    #[serde(rename = "E_TIMEOUT")]
    Timeout,
    #[serde(rename = "E_MALFORMED_RESPONSE")]
    MalformedResponse,
    #[serde(rename = "E_CLIPBOARD")]
    Clipboard,
    #[serde(rename = "E_REWRITE")]
    Rewrite,
}

/// アプリケーションエラー（レンダラー向けペイロード兼用）
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl AppError {
    pub fn clipboard(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Clipboard,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn rewrite(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            recoverable: true,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
