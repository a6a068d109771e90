pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod probe;
pub mod replay;
pub mod runtime;
pub mod selectors;

pub use probe::{cmd_probe, ProbeArgs};
pub use replay::{cmd_replay, ReplayArgs, ReplayOutcome};
pub use selectors::cmd_selectors;
