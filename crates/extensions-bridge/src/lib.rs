//! Cross-context message protocol.
//!
//! The settings surface lives in its own embedded document and talks to the host
//! page only through structured messages posted to a window. Every payload is
//! validated into a [`BoundaryMessage`] before anything acts on it; unknown or
//! malformed payloads are rejected and logged.

pub mod message;
pub mod window;

use thiserror::Error;

pub use message::{BoundaryMessage, COMPLETION, CLOSE, SETTINGS_SUBMITTED};
pub use window::{BoundaryListener, Envelope, ListenerId, MessageWindow};

/// Errors raised while validating boundary payloads.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("message is not an object")]
    NotAnObject,
    #[error("message has no string `type` field")]
    MissingType,
    #[error("unrecognized message type `{0}`")]
    UnknownType(String),
    #[error("malformed `{kind}` message: {reason}")]
    Malformed { kind: String, reason: String },
}
