//! Compose-surface detection.
//!
//! The watcher observes every mutation batch under the page body and, when an added
//! node looks like a compose surface, asks the [`CoalescingScheduler`] to run the
//! injection trigger once the host has had time to finish building it.

pub mod scheduler;
pub mod watcher;

pub use scheduler::CoalescingScheduler;
pub use watcher::{MutationWatcher, WatchState, DEFAULT_SETTLE_DELAY};
