//! Selector resolution with ordered fallback chains
//!
//! Host markup is third-party and unversioned, so every semantic field is located
//! through a list of patterns tried in priority order:
//! - a small CSS-subset parser and matcher (`selector`)
//! - per-role chains and the built-in catalog (`types`)
//! - first-match resolution that skips unparseable patterns (`resolver`)

pub mod errors;
pub mod resolver;
pub mod selector;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use selector::*;
pub use types::*;
