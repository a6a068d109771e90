use std::sync::Arc;

use extensions_bridge::{BoundaryListener, BoundaryMessage, ListenerId, MessageWindow};
use field_extractor::{FieldExtractor, InsertOutcome};
use generation_client::ReplyGenerator;
use host_dom::{DomError, NodeId, Page};
use mailassist_core_types::{FrameId, GenerationRequest, GenerationSettings, SessionId};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::SurfaceError;
use crate::placement::OverlayPlacement;
use crate::ports::Notifier;
use crate::surface::SettingsSurface;

/// Class carried by the embedded frame element.
pub const OVERLAY_CLASS: &str = "ai-reply-overlay";

const SURFACE_DOCUMENT: &str = "popup.html";

#[derive(Clone, Debug, Default)]
pub struct ControllerOptions {
    pub placement: OverlayPlacement,
    /// Alert the user when a reply arrives but no compose input can take it.
    pub alert_on_missing_compose: bool,
}

/// Live overlay: the embedded frame, its listener and its surface.
struct OverlaySession {
    id: SessionId,
    frame_node: NodeId,
    listener: ListenerId,
    surface: SettingsSurface,
}

struct ControllerInner {
    page: Page,
    host_window: MessageWindow,
    extractor: FieldExtractor,
    generator: Arc<dyn ReplyGenerator>,
    notifier: Arc<dyn Notifier>,
    options: ControllerOptions,
    current: Mutex<Option<OverlaySession>>,
}

#[derive(Clone)]
pub struct SurfaceController {
    inner: Arc<ControllerInner>,
}

impl SurfaceController {
    pub fn new(
        page: Page,
        host_window: MessageWindow,
        extractor: FieldExtractor,
        generator: Arc<dyn ReplyGenerator>,
        notifier: Arc<dyn Notifier>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                page,
                host_window,
                extractor,
                generator,
                notifier,
                options,
                current: Mutex::new(None),
            }),
        }
    }

    pub fn host_window(&self) -> &MessageWindow {
        &self.inner.host_window
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.inner.current.lock().as_ref().map(|s| s.id.clone())
    }

    /// Surface of the live session, if any.
    pub fn surface(&self) -> Option<SettingsSurface> {
        self.inner.current.lock().as_ref().map(|s| s.surface.clone())
    }

    /// Opens a new overlay session, tearing down the current one first.
    pub fn open_surface(&self) -> Result<SettingsSurface, SurfaceError> {
        let previous = self.inner.current.lock().take();
        if let Some(previous) = previous {
            self.inner.teardown(previous, "replaced by a new session");
        }

        let id = SessionId::new();
        let frame = FrameId::new();
        let frame_node = self.inner.embed_frame(&frame)?;

        let listener = self.inner.host_window.add_listener();
        let surface = SettingsSurface::new(frame.clone(), self.inner.host_window.clone());
        surface.start();

        *self.inner.current.lock() = Some(OverlaySession {
            id: id.clone(),
            frame_node,
            listener: listener.id(),
            surface: surface.clone(),
        });
        info!(session = %id, frame = %frame, "settings surface opened");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_session(id, frame, listener).await });

        Ok(surface)
    }

    /// Tears down the live session, if any.
    pub fn close(&self) -> bool {
        let current = self.inner.current.lock().take();
        match current {
            Some(session) => {
                self.inner.teardown(session, "closed");
                true
            }
            None => false,
        }
    }
}

impl ControllerInner {
    fn embed_frame(&self, frame: &FrameId) -> Result<NodeId, DomError> {
        let style = self.options.placement.style();
        self.page.mutate(|tree| -> Result<NodeId, DomError> {
            let node = tree.create_element("iframe");
            tree.set_attribute(node, "class", OVERLAY_CLASS)?;
            tree.set_attribute(node, "src", SURFACE_DOCUMENT)?;
            tree.set_attribute(node, "style", style)?;
            tree.set_attribute(node, "data-frame-id", frame.0.clone())?;
            let body = tree.body();
            tree.append_child(body, node)?;
            Ok(node)
        })
    }

    fn is_current(&self, session: &SessionId) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|current| &current.id == session)
    }

    async fn run_session(
        self: Arc<Self>,
        session: SessionId,
        frame: FrameId,
        mut listener: BoundaryListener,
    ) {
        // Generation runs beside the loop so Close is honoured while a reply is pending.
        let mut generation: Option<JoinHandle<()>> = None;
        while let Some((source, message)) = listener.next().await {
            if !self.is_current(&session) {
                break;
            }
            if source != frame {
                debug!(session = %session, %source, "ignoring message from another frame");
                continue;
            }
            match message {
                BoundaryMessage::SettingsSubmitted { settings } => {
                    if generation.as_ref().is_some_and(|task| !task.is_finished()) {
                        debug!(session = %session, "generation already in flight; ignoring settings");
                        continue;
                    }
                    let inner = Arc::clone(&self);
                    let (session, frame) = (session.clone(), frame.clone());
                    generation = Some(tokio::spawn(async move {
                        inner.handle_settings(&session, &frame, settings).await;
                    }));
                }
                BoundaryMessage::Close => {
                    self.teardown_if_current(&session, "close requested");
                }
                BoundaryMessage::Completion => {
                    warn!(session = %session, "completion is addressed to the surface; ignoring");
                }
            }
        }
        debug!(session = %session, "session listener finished");
    }

    async fn handle_settings(&self, session: &SessionId, frame: &FrameId, settings: GenerationSettings) {
        let extraction = self.extractor.extract();
        let request = GenerationRequest::new(&extraction, settings);
        let result = self.generator.generate(&request).await;

        if !self.is_current(session) {
            info!(session = %session, "session ended while generating; dropping result");
            return;
        }

        match result {
            Ok(reply) => {
                if self.extractor.insert_reply(&reply) == InsertOutcome::NoComposeInput
                    && self.options.alert_on_missing_compose
                {
                    self.notifier
                        .alert("Failed to insert AI reply: no compose window found");
                }
                if let Some(surface) = self.surface_of(session) {
                    surface
                        .window()
                        .post_message(FrameId::host(), &BoundaryMessage::Completion);
                }
                debug!(session = %session, %frame, "reply delivered");
                self.teardown_if_current(session, "completed");
            }
            Err(err) => {
                error!(session = %session, %err, "reply generation failed");
                self.notifier
                    .alert(&format!("Failed to generate AI reply: {err}"));
                self.teardown_if_current(session, "generation failed");
            }
        }
    }

    fn surface_of(&self, session: &SessionId) -> Option<SettingsSurface> {
        self.current
            .lock()
            .as_ref()
            .filter(|current| &current.id == session)
            .map(|current| current.surface.clone())
    }

    fn teardown_if_current(&self, session: &SessionId, reason: &str) -> bool {
        let taken = {
            let mut current = self.current.lock();
            if current.as_ref().is_some_and(|c| &c.id == session) {
                current.take()
            } else {
                None
            }
        };
        match taken {
            Some(session) => {
                self.teardown(session, reason);
                true
            }
            None => false,
        }
    }

    fn teardown(&self, session: OverlaySession, reason: &str) {
        self.host_window.remove_listener(session.listener);
        session.surface.detach();
        self.page.mutate(|tree| tree.remove(session.frame_node));
        info!(session = %session.id, reason, "settings surface torn down");
    }
}
