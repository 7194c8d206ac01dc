pub mod app_service;
pub mod orchestrator;

pub use app_service::PhraserService;
pub use orchestrator::{RewriteOrchestrator, RewriteOutcome};
