mod clipboard;

pub use clipboard::ClipboardOutput;

use std::sync::Arc;

use crate::domain::error::AppError;

/// 出力先 trait
pub trait OutputTarget: Send + Sync {
    fn deliver(&self, text: &str) -> Result<(), AppError>;
    fn name(&self) -> &str;
}

/// 出力ルーター: 結果テキストを出力先へ渡す
pub struct OutputRouter {
    target: Arc<dyn OutputTarget>,
}

impl OutputRouter {
    pub fn new() -> Self {
        Self::with_target(Arc::new(ClipboardOutput::new()))
    }

    pub fn with_target(target: Arc<dyn OutputTarget>) -> Self {
        Self { target }
    }

    /// 空文字は何もしない。配信したら true
    pub fn deliver_if_present(&self, text: &str) -> Result<bool, AppError> {
        if text.is_empty() {
            return Ok(false);
        }
        self.target.deliver(text)?;
        Ok(true)
    }

    pub fn target_name(&self) -> &str {
        self.target.name()
    }
}

impl Default for OutputRouter {
    fn default() -> Self {
        Self::new()
    }
}
