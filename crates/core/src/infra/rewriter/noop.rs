use async_trait::async_trait;
use super::{RewriteContext, RewriteError, Rewriter};

/// NoopRewriter: テキストをそのまま返すモック実装。
/// サービスなしでの動作確認用。
pub struct NoopRewriter;

#[async_trait]
impl Rewriter for NoopRewriter {
    async fn rewrite(
        &self,
        text: &str,
        ctx: RewriteContext,
    ) -> Result<String, RewriteError> {
        Ok(format!("[{}] {text}", ctx.tone))
    }

    fn name(&self) -> &str {
        "noop"
    }
}
