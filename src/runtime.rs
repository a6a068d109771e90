//! Wires the page-side components into one running integration.

use std::sync::Arc;

use action_injector::{ActionInjector, InjectOutcome};
use action_locator::{ElementResolver, FieldRole};
use extensions_bridge::MessageWindow;
use field_extractor::FieldExtractor;
use generation_client::{GenerationError, HttpGenerationClient, ReplyGenerator};
use host_dom::{NodeId, Page};
use mutation_watcher::{MutationWatcher, WatchState};
use settings_surface::{LogNotifier, Notifier, SurfaceController};
use tokio::task::JoinHandle;
use tracing::error;

use crate::config::AssistConfig;

/// Everything the integration attaches to one host page.
///
/// Clicking an injected control opens a settings session; the watcher re-injects
/// the control whenever a compose surface appears.
#[derive(Clone)]
pub struct AssistRuntime {
    page: Page,
    resolver: ElementResolver,
    extractor: FieldExtractor,
    controller: SurfaceController,
    injector: ActionInjector,
    watcher: MutationWatcher,
}

impl AssistRuntime {
    pub fn new(
        page: Page,
        config: &AssistConfig,
        generator: Arc<dyn ReplyGenerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let resolver = ElementResolver::new(config.catalog());
        let extractor = FieldExtractor::new(page.clone(), resolver.clone());
        let controller = SurfaceController::new(
            page.clone(),
            MessageWindow::new(),
            extractor.clone(),
            generator,
            notifier,
            config.controller_options(),
        );

        let on_click = {
            let controller = controller.clone();
            Arc::new(move || {
                if let Err(err) = controller.open_surface() {
                    error!(%err, "failed to open settings surface");
                }
            })
        };
        let injector = ActionInjector::new(page.clone(), resolver.clone(), on_click);

        let trigger = {
            let injector = injector.clone();
            Arc::new(move || {
                injector.inject();
            })
        };
        let watcher = MutationWatcher::new(
            page.clone(),
            resolver.clone(),
            config.watcher.settle_delay,
            trigger,
        );

        Self {
            page,
            resolver,
            extractor,
            controller,
            injector,
            watcher,
        }
    }

    /// Runtime talking to the configured HTTP endpoint, alerts going to the log.
    pub fn from_config(page: Page, config: &AssistConfig) -> Result<Self, GenerationError> {
        let client = HttpGenerationClient::new(config.generation.endpoint.clone())?;
        Ok(Self::new(
            page,
            config,
            Arc::new(client),
            Arc::new(LogNotifier),
        ))
    }

    /// Starts watching the page; the task ends when the page goes away.
    pub fn start(&self) -> JoinHandle<()> {
        self.watcher.start()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    pub fn controller(&self) -> &SurfaceController {
        &self.controller
    }

    pub fn watch_state(&self) -> WatchState {
        self.watcher.state()
    }

    /// Injected controls currently in the page.
    pub fn controls(&self) -> Vec<NodeId> {
        self.injector.controls()
    }

    /// Injects immediately, without waiting for a compose mutation.
    pub fn inject_now(&self) -> InjectOutcome {
        self.injector.inject()
    }

    /// Text of the compose input, if the page has one.
    pub fn compose_text(&self) -> Option<String> {
        self.page.read(|tree| {
            self.resolver
                .resolve_node(tree, FieldRole::ComposeInput)
                .map(|node| tree.inner_text(node))
        })
    }
}
