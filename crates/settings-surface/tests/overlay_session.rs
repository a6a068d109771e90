use std::sync::Arc;
use std::time::Duration;

use action_locator::ElementResolver;
use async_trait::async_trait;
use extensions_bridge::MessageWindow;
use field_extractor::FieldExtractor;
use generation_client::{GenerationError, ReplyGenerator};
use host_dom::{NodeSpec, Page};
use mailassist_core_types::{FrameId, GenerationRequest, GenerationSettings, Tone};
use parking_lot::Mutex;
use serde_json::json;
use settings_surface::{
    ControllerOptions, Notifier, SurfaceController, GENERATING_LABEL, OVERLAY_CLASS,
};
use tokio::sync::Notify;

struct StubGenerator {
    reply: Result<String, GenerationError>,
    requests: Mutex<Vec<GenerationRequest>>,
    gate: Option<Arc<Notify>>,
}

impl StubGenerator {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    fn failing(err: GenerationError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            requests: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    fn gated(text: &str, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
            gate: Some(gate),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ReplyGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}

struct Harness {
    page: Page,
    controller: SurfaceController,
    notifier: Arc<RecordingNotifier>,
}

fn gmail_page() -> Page {
    Page::from_specs(&[
        NodeSpec::new("span").class("gD").text("Alice Smith"),
        NodeSpec::new("div")
            .class("a3s")
            .class("aiL")
            .text("Could you send the slides before Friday?"),
        NodeSpec::new("div")
            .attr("role", "dialog")
            .child(NodeSpec::new("input").attr("aria-label", "To").value("Alice Smith <alice@x.com>"))
            .child(NodeSpec::new("input").attr("name", "subjectbox").value(""))
            .child(
                NodeSpec::new("div")
                    .attr("role", "textbox")
                    .attr("g_editable", "true")
                    .editable(),
            ),
    ])
}

fn harness(page: Page, generator: Arc<dyn ReplyGenerator>, options: ControllerOptions) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let extractor = FieldExtractor::new(page.clone(), ElementResolver::default());
    let controller = SurfaceController::new(
        page.clone(),
        MessageWindow::new(),
        extractor,
        generator,
        notifier.clone(),
        options,
    );
    Harness {
        page,
        controller,
        notifier,
    }
}

fn compose_text(page: &Page) -> String {
    page.read(|tree| {
        tree.descendants(tree.body())
            .into_iter()
            .find(|n| tree.element(*n).unwrap().attribute("role") == Some("textbox"))
            .map(|n| tree.inner_text(n))
            .unwrap_or_default()
    })
}

fn overlay_count(page: &Page) -> usize {
    page.read(|tree| {
        tree.descendants(tree.body())
            .into_iter()
            .filter(|n| tree.element(*n).unwrap().has_class(OVERLAY_CLASS))
            .count()
    })
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn successful_generation_inserts_text_and_ends_session() {
    let generator = StubGenerator::replying("Sure, slides are attached.");
    let h = harness(gmail_page(), generator.clone(), ControllerOptions::default());

    let surface = h.controller.open_surface().unwrap();
    assert_eq!(overlay_count(&h.page), 1);
    assert_eq!(h.controller.host_window().listener_count(), 1);

    surface.set_settings(GenerationSettings {
        tone: Tone::Casual,
        include_names: true,
        include_signature: false,
        keep_formatting: false,
    });
    assert!(surface.submit());
    assert_eq!(surface.button().label, GENERATING_LABEL);
    assert!(!surface.button().enabled);
    assert!(!surface.submit());

    wait_until(|| h.controller.active_session().is_none()).await;

    assert_eq!(compose_text(&h.page), "Sure, slides are attached.");
    assert_eq!(overlay_count(&h.page), 0);
    assert_eq!(h.controller.host_window().listener_count(), 0);
    assert!(h.notifier.alerts().is_empty());

    let requests = generator.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.tone, Tone::Casual);
    assert_eq!(request.sender_name.as_deref(), Some("Alice Smith"));
    assert_eq!(request.receiver_name.as_deref(), Some("Alice Smith"));
    assert_eq!(request.subject, None);
    assert_eq!(request.email_content, "Could you send the slides before Friday?");

    wait_until(|| surface.completed()).await;
}

#[tokio::test(start_paused = true)]
async fn failed_generation_alerts_once_and_leaves_compose_untouched() {
    let generator = StubGenerator::failing(GenerationError::Status { status: 500 });
    let h = harness(gmail_page(), generator, ControllerOptions::default());

    let surface = h.controller.open_surface().unwrap();
    surface.submit();
    wait_until(|| h.controller.active_session().is_none()).await;
    settle().await;

    assert_eq!(
        h.notifier.alerts(),
        vec!["Failed to generate AI reply: API request failed with status 500".to_string()]
    );
    assert_eq!(compose_text(&h.page), "");
    assert_eq!(overlay_count(&h.page), 0);
    assert_eq!(h.controller.host_window().listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn reopening_replaces_the_previous_session() {
    let generator = StubGenerator::replying("unused");
    let h = harness(gmail_page(), generator.clone(), ControllerOptions::default());

    let first = h.controller.open_surface().unwrap();
    let first_session = h.controller.active_session().unwrap();
    let second = h.controller.open_surface().unwrap();

    assert_ne!(h.controller.active_session().unwrap(), first_session);
    assert_eq!(overlay_count(&h.page), 1);
    assert_eq!(h.controller.host_window().listener_count(), 1);
    assert_ne!(first.frame(), second.frame());

    // The stale surface can still post, but nobody acts on it.
    first.submit();
    settle().await;
    assert_eq!(generator.calls(), 0);
    assert!(h.controller.active_session().is_some());
}

#[tokio::test(start_paused = true)]
async fn close_message_tears_down() {
    let h = harness(gmail_page(), StubGenerator::replying("x"), ControllerOptions::default());

    let surface = h.controller.open_surface().unwrap();
    surface.close();
    wait_until(|| h.controller.active_session().is_none()).await;

    assert_eq!(overlay_count(&h.page), 0);
    assert_eq!(h.controller.host_window().listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn unknown_messages_are_rejected_without_ending_the_session() {
    let generator = StubGenerator::replying("x");
    let h = harness(gmail_page(), generator.clone(), ControllerOptions::default());

    let surface = h.controller.open_surface().unwrap();
    let window = h.controller.host_window();
    window.post(surface.frame().clone(), json!({"type": "AI_REPLY_SETTINGZ"}));
    window.post(surface.frame().clone(), json!({"type": "AI_REPLY_SETTINGS"}));
    window.post(FrameId::new(), json!({"type": "CLOSE_POPUP"}));
    settle().await;

    assert!(h.controller.active_session().is_some());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn superseded_session_drops_its_reply() {
    let gate = Arc::new(Notify::new());
    let generator = StubGenerator::gated("late reply", gate.clone());
    let h = harness(gmail_page(), generator.clone(), ControllerOptions::default());

    let first = h.controller.open_surface().unwrap();
    first.submit();
    wait_until(|| generator.calls() == 1).await;

    let _second = h.controller.open_surface().unwrap();
    gate.notify_one();
    settle().await;

    assert_eq!(compose_text(&h.page), "");
    assert!(h.controller.active_session().is_some());
    assert_eq!(overlay_count(&h.page), 1);
    assert!(h.notifier.alerts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn close_during_generation_ends_session_and_drops_reply() {
    let gate = Arc::new(Notify::new());
    let generator = StubGenerator::gated("late reply", gate.clone());
    let h = harness(gmail_page(), generator.clone(), ControllerOptions::default());

    let surface = h.controller.open_surface().unwrap();
    assert!(surface.submit());
    wait_until(|| generator.calls() == 1).await;

    surface.close();
    wait_until(|| h.controller.active_session().is_none()).await;
    assert_eq!(overlay_count(&h.page), 0);
    assert_eq!(h.controller.host_window().listener_count(), 0);

    gate.notify_one();
    settle().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(compose_text(&h.page), "");
    assert!(h.controller.active_session().is_none());
    assert!(h.notifier.alerts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_compose_input_is_silent_by_default() {
    let page = Page::from_specs(&[NodeSpec::new("div").class("a3s").class("aiL").text("Hi")]);
    let h = harness(page, StubGenerator::replying("Hello!"), ControllerOptions::default());

    h.controller.open_surface().unwrap().submit();
    wait_until(|| h.controller.active_session().is_none()).await;

    assert!(h.notifier.alerts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_compose_input_can_alert() {
    let page = Page::from_specs(&[NodeSpec::new("div").class("a3s").class("aiL").text("Hi")]);
    let options = ControllerOptions {
        alert_on_missing_compose: true,
        ..Default::default()
    };
    let h = harness(page, StubGenerator::replying("Hello!"), options);

    h.controller.open_surface().unwrap().submit();
    wait_until(|| h.controller.active_session().is_none()).await;

    assert_eq!(h.notifier.alerts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn explicit_close_without_session_is_a_no_op() {
    let h = harness(gmail_page(), StubGenerator::replying("x"), ControllerOptions::default());
    assert!(!h.controller.close());

    h.controller.open_surface().unwrap();
    assert!(h.controller.close());
    assert!(h.controller.active_session().is_none());
    assert_eq!(overlay_count(&h.page), 0);
}
