pub mod metrics;
pub mod output;
pub mod rewriter;
