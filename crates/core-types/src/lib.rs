//! Shared primitives: identifiers and the data carried from page to service.

pub mod model;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use model::{ExtractionResult, GenerationRequest, GenerationSettings, Tone};

/// One overlay session, from embedding to teardown.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies an embedded document (the overlay frame) as a message source.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub String);

impl FrameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The host page's own window.
    pub fn host() -> Self {
        Self("host".to_string())
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
