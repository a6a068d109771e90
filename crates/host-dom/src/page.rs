//! Shared handle over a host document.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::fixture::NodeSpec;
use crate::mutation::MutationBatch;
use crate::tree::{DomTree, NodeId};

pub use crate::tree::ClickHandler;

/// Cheaply cloneable handle to one host document.
///
/// The tree lock is only ever held for synchronous work; click handlers and
/// observers run after it is released so they are free to touch the page again.
#[derive(Clone, Default)]
pub struct Page {
    inner: Arc<PageInner>,
}

#[derive(Default)]
struct PageInner {
    tree: Mutex<DomTree>,
    observers: Mutex<Vec<mpsc::UnboundedSender<MutationBatch>>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a page whose body holds the given subtrees.
    pub fn from_specs(specs: &[NodeSpec]) -> Self {
        let page = Self::new();
        page.mutate(|tree| {
            let body = tree.body();
            for spec in specs {
                spec.build_into(tree, body);
            }
        });
        page
    }

    pub fn read<R>(&self, f: impl FnOnce(&DomTree) -> R) -> R {
        let tree = self.inner.tree.lock();
        f(&tree)
    }

    /// Applies changes and delivers the resulting records as one batch.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut DomTree) -> R) -> R {
        let (result, records) = {
            let mut tree = self.inner.tree.lock();
            let result = f(&mut tree);
            (result, tree.take_records())
        };
        if !records.is_empty() {
            self.deliver(MutationBatch { records });
        }
        result
    }

    fn deliver(&self, batch: MutationBatch) {
        let mut observers = self.inner.observers.lock();
        observers.retain(|tx| tx.send(batch.clone()).is_ok());
        trace!(
            records = batch.records.len(),
            observers = observers.len(),
            "delivered mutation batch"
        );
    }

    /// Subscribes to mutation batches for the whole body subtree.
    pub fn observe(&self) -> mpsc::UnboundedReceiver<MutationBatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.observers.lock().push(tx);
        rx
    }

    pub fn observer_count(&self) -> usize {
        let mut observers = self.inner.observers.lock();
        observers.retain(|tx| !tx.is_closed());
        observers.len()
    }

    pub fn add_click_listener(&self, node: NodeId, handler: ClickHandler) -> bool {
        self.inner.tree.lock().add_click_listener(node, handler)
    }

    /// Dispatches a click to `node`, returning how many handlers ran.
    pub fn click(&self, node: NodeId) -> usize {
        let handlers = self.inner.tree.lock().click_listeners(node);
        debug!(%node, handlers = handlers.len(), "dispatching click");
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }
}
