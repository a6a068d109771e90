//! MailAssist library
//!
//! Exposes the runtime assembly and configuration for the CLI and for integration testing

pub mod cli;
pub mod config;
pub mod runtime;

pub use config::AssistConfig;
pub use runtime::AssistRuntime;
