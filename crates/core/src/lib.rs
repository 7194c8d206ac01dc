//! Tone-adjusted paraphrasing client core.
//!
//! `domain` holds the session model, `infra` the rewrite service client,
//! clipboard and metrics, and `usecase` the orchestrator and trigger bindings
//! a renderer calls into.

pub mod domain;
pub mod infra;
pub mod usecase;
