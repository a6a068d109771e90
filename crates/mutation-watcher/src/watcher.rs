use std::sync::Arc;
use std::time::Duration;

use action_locator::{ElementResolver, FieldRole};
use host_dom::{MutationBatch, Page};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::scheduler::CoalescingScheduler;

/// Time the host page gets to finish building a compose surface.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Action run once a compose surface has settled.
pub type Trigger = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchState {
    /// Not started yet, or the page went away.
    Idle,
    /// Observing mutation batches with nothing pending.
    Watching,
    /// A compose surface was seen; the trigger fires after the settle delay.
    Triggered,
}

#[derive(Clone)]
pub struct MutationWatcher {
    page: Page,
    resolver: ElementResolver,
    scheduler: CoalescingScheduler,
    trigger: Trigger,
    state: Arc<Mutex<WatchState>>,
}

impl MutationWatcher {
    pub fn new(page: Page, resolver: ElementResolver, settle_delay: Duration, trigger: Trigger) -> Self {
        Self {
            page,
            resolver,
            scheduler: CoalescingScheduler::new(settle_delay),
            trigger,
            state: Arc::new(Mutex::new(WatchState::Idle)),
        }
    }

    pub fn state(&self) -> WatchState {
        *self.state.lock()
    }

    /// Starts observing for the lifetime of the page.
    ///
    /// The subscription is taken before this returns, so mutations made right after
    /// `start` are never missed.
    pub fn start(&self) -> JoinHandle<()> {
        let mut batches = self.page.observe();
        *self.state.lock() = WatchState::Watching;
        info!(delay_ms = self.scheduler.delay().as_millis() as u64, "mutation watcher started");

        let watcher = self.clone();
        tokio::spawn(async move {
            while let Some(batch) = batches.recv().await {
                watcher.on_batch(&batch);
            }
            *watcher.state.lock() = WatchState::Idle;
            debug!("page observer closed; mutation watcher stopped");
        })
    }

    fn on_batch(&self, batch: &MutationBatch) {
        if !self.batch_has_compose(batch) {
            return;
        }
        if self.scheduler.is_pending() {
            trace!("injection already scheduled; batch absorbed");
            return;
        }
        // The fired action resets this, so it must be set before scheduling.
        *self.state.lock() = WatchState::Triggered;

        let state = Arc::clone(&self.state);
        let scheduler = self.scheduler.clone();
        let trigger = Arc::clone(&self.trigger);
        let scheduled = self.scheduler.schedule(move || {
            {
                let mut state = state.lock();
                if !scheduler.is_pending() {
                    *state = WatchState::Watching;
                }
            }
            trigger();
        });
        if scheduled.is_some() {
            debug!("compose surface detected; injection scheduled");
        }
    }

    /// Whether any added node is, or contains, a compose indicator.
    pub fn batch_has_compose(&self, batch: &MutationBatch) -> bool {
        self.page.read(|tree| {
            batch.added_nodes().any(|node| {
                tree.element(node).is_some()
                    && self
                        .resolver
                        .matches_within(tree, FieldRole::ComposeIndicator, node)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_dom::NodeSpec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SETTLE: Duration = Duration::from_millis(30);

    fn counting_watcher(page: &Page) -> (MutationWatcher, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let watcher = MutationWatcher::new(
            page.clone(),
            ElementResolver::default(),
            SETTLE,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (watcher, fired)
    }

    fn add(page: &Page, spec: NodeSpec) {
        page.mutate(|tree| {
            let body = tree.body();
            spec.build_into(tree, body);
        });
    }

    async fn settle() {
        tokio::time::sleep(SETTLE * 4).await;
    }

    #[tokio::test(start_paused = true)]
    async fn walks_through_states() {
        let page = Page::new();
        let (watcher, fired) = counting_watcher(&page);
        assert_eq!(watcher.state(), WatchState::Idle);

        let _task = watcher.start();
        assert_eq!(watcher.state(), WatchState::Watching);

        add(&page, NodeSpec::new("div").attr("role", "dialog"));
        tokio::task::yield_now().await;
        assert_eq!(watcher.state(), WatchState::Triggered);

        settle().await;
        assert_eq!(watcher.state(), WatchState::Watching);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn descendant_indicator_counts() {
        let page = Page::new();
        let (watcher, fired) = counting_watcher(&page);
        let _task = watcher.start();

        add(
            &page,
            NodeSpec::new("div").child(NodeSpec::new("div").child(NodeSpec::new("td").class("btC"))),
        );
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_batches_coalesce_into_one_attempt() {
        let page = Page::new();
        let (watcher, fired) = counting_watcher(&page);
        let _task = watcher.start();

        for _ in 0..4 {
            add(&page, NodeSpec::new("div").class("aDh"));
            tokio::task::yield_now().await;
        }
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_unrelated_and_removed_nodes() {
        let page = Page::from_specs(&[NodeSpec::new("div").class("aDh")]);
        let (watcher, fired) = counting_watcher(&page);
        let _task = watcher.start();

        add(&page, NodeSpec::new("div").class("inbox-row"));
        page.mutate(|tree| {
            let first = tree.descendants(tree.body())[0];
            tree.remove(first);
        });
        settle().await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(watcher.state(), WatchState::Watching);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn zero_delay_never_leaves_state_triggered() {
        for _ in 0..50 {
            let page = Page::new();
            let fired = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&fired);
            let watcher = MutationWatcher::new(
                page.clone(),
                ElementResolver::default(),
                Duration::ZERO,
                Arc::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            );
            let task = watcher.start();

            add(&page, NodeSpec::new("div").attr("role", "dialog"));
            tokio::time::timeout(Duration::from_secs(5), async {
                while fired.load(Ordering::SeqCst) == 0 {
                    tokio::task::yield_now().await;
                }
            })
            .await
            .expect("trigger fired");

            assert_eq!(watcher.state(), WatchState::Watching);
            task.abort();
        }
    }
}
