//! The isolated settings surface.
//!
//! This side never touches the host page: it only owns its form and button and
//! talks to the host through boundary messages posted to the host window.

use std::sync::Arc;

use extensions_bridge::{BoundaryMessage, ListenerId, MessageWindow};
use mailassist_core_types::{FrameId, GenerationSettings};
use parking_lot::Mutex;
use tracing::{debug, warn};

pub const GENERATE_LABEL: &str = "Generate Reply";
pub const GENERATING_LABEL: &str = "Generating...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonState {
    pub enabled: bool,
    pub label: String,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self {
            enabled: true,
            label: GENERATE_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    settings: GenerationSettings,
    button: ButtonState,
    completed: bool,
    listener: Option<ListenerId>,
}

/// Handle to one embedded settings surface.
#[derive(Clone)]
pub struct SettingsSurface {
    inner: Arc<SurfaceInner>,
}

struct SurfaceInner {
    frame: FrameId,
    host: MessageWindow,
    own: MessageWindow,
    state: Mutex<SurfaceState>,
}

impl SettingsSurface {
    pub(crate) fn new(frame: FrameId, host: MessageWindow) -> Self {
        Self {
            inner: Arc::new(SurfaceInner {
                frame,
                host,
                own: MessageWindow::new(),
                state: Mutex::new(SurfaceState::default()),
            }),
        }
    }

    pub fn frame(&self) -> &FrameId {
        &self.inner.frame
    }

    /// The surface's own window, where the host posts to it.
    pub fn window(&self) -> &MessageWindow {
        &self.inner.own
    }

    pub fn settings(&self) -> GenerationSettings {
        self.inner.state.lock().settings
    }

    pub fn set_settings(&self, settings: GenerationSettings) {
        self.inner.state.lock().settings = settings;
    }

    pub fn button(&self) -> ButtonState {
        self.inner.state.lock().button.clone()
    }

    /// Whether the host reported a finished reply.
    pub fn completed(&self) -> bool {
        self.inner.state.lock().completed
    }

    /// Disables the generate button and sends the current settings to the host.
    ///
    /// Returns `false` when a submission is already in flight.
    pub fn submit(&self) -> bool {
        let settings = {
            let mut state = self.inner.state.lock();
            if !state.button.enabled {
                return false;
            }
            state.button = ButtonState {
                enabled: false,
                label: GENERATING_LABEL.to_string(),
            };
            state.settings
        };
        let delivered = self.inner.host.post_message(
            self.inner.frame.clone(),
            &BoundaryMessage::SettingsSubmitted { settings },
        );
        debug!(frame = %self.inner.frame, delivered, "settings submitted");
        true
    }

    /// Asks the host to tear the overlay down.
    pub fn close(&self) {
        self.inner
            .host
            .post_message(self.inner.frame.clone(), &BoundaryMessage::Close);
    }

    /// Starts listening on the surface's own window.
    pub(crate) fn start(&self) {
        let mut listener = self.inner.own.add_listener();
        self.inner.state.lock().listener = Some(listener.id());

        let surface = self.clone();
        tokio::spawn(async move {
            while let Some((_, message)) = listener.next().await {
                match message {
                    BoundaryMessage::Completion => {
                        surface.inner.state.lock().completed = true;
                        surface.close();
                    }
                    other => {
                        warn!(kind = other.kind(), "surface ignoring unexpected message");
                    }
                }
            }
        });
    }

    /// Stops listening; messages already delivered are still handled.
    pub(crate) fn detach(&self) {
        if let Some(id) = self.inner.state.lock().listener.take() {
            self.inner.own.remove_listener(id);
        }
    }
}
