use crate::domain::error::AppError;
use super::OutputTarget;

/// システムクリップボード（arboard）
pub struct ClipboardOutput;

impl ClipboardOutput {
    pub fn new() -> Self {
        Self
    }

    /// クリップボードのテキストを読む（貼り付け入力用）
    pub fn read_text() -> Result<String, AppError> {
        let mut ctx = arboard::Clipboard::new()
            .map_err(|e| AppError::clipboard(format!("Clipboard init failed: {e}")))?;
        ctx.get_text()
            .map_err(|e| AppError::clipboard(format!("Clipboard read failed: {e}")))
    }
}

impl Default for ClipboardOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputTarget for ClipboardOutput {
    fn deliver(&self, text: &str) -> Result<(), AppError> {
        let mut ctx = arboard::Clipboard::new()
            .map_err(|e| AppError::clipboard(format!("Clipboard init failed: {e}")))?;
        ctx.set_text(text)
            .map_err(|e| AppError::clipboard(format!("Clipboard write failed: {e}")))?;
        log::info!("クリップボードに出力: {} 文字", text.chars().count());
        Ok(())
    }

    fn name(&self) -> &str {
        "clipboard"
    }
}
