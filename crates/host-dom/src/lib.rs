//! Host page model.
//!
//! Everything the integration layer knows about the third-party page goes through
//! this crate: an element arena ([`DomTree`]), a shared [`Page`] handle that batches
//! mutation records for observers, click listeners and caret-based text insertion.

pub mod errors;
pub mod fixture;
pub mod mutation;
pub mod page;
pub mod tree;

pub use errors::DomError;
pub use fixture::{FixtureError, NodeSpec, PageFixture};
pub use mutation::{MutationBatch, MutationRecord};
pub use page::{ClickHandler, Page};
pub use tree::{DomTree, Element, NodeId};
