pub mod error;
pub mod session;
pub mod settings;
pub mod types;

mod serde_tests;
