use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use action_injector::InjectOutcome;
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use generation_client::HttpGenerationClient;
use host_dom::{NodeSpec, Page, PageFixture};
use mailassist_core_types::{GenerationSettings, Tone};
use parking_lot::Mutex;
use settings_surface::Notifier;
use tracing::{debug, error, info};

use crate::config::AssistConfig;
use crate::runtime::AssistRuntime;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// Page fixture (YAML)
    #[arg(long, value_name = "FILE")]
    pub page: PathBuf,

    /// Reply tone
    #[arg(long, default_value = "auto")]
    pub tone: Tone,

    /// Leave sender and recipient names out of the request
    #[arg(long)]
    pub no_names: bool,

    /// Ask for a reply without a signature
    #[arg(long)]
    pub no_signature: bool,

    /// Ask the service to keep the original formatting
    #[arg(long)]
    pub keep_formatting: bool,

    /// How long to wait for each step
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}

impl ReplayArgs {
    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            tone: self.tone,
            include_names: !self.no_names,
            include_signature: !self.no_signature,
            keep_formatting: self.keep_formatting,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Compose input text once the session ended.
    pub compose_text: String,
    /// Alerts raised during the session, in order.
    pub alerts: Vec<String>,
}

/// Keeps alerts for the report and logs them as they happen.
#[derive(Default)]
pub struct CollectingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.alerts.lock())
    }
}

impl Notifier for CollectingNotifier {
    fn alert(&self, message: &str) {
        error!(alert = message, "user notification");
        self.alerts.lock().push(message.to_string());
    }
}

pub async fn cmd_replay(args: ReplayArgs, config: &AssistConfig) -> Result<ReplayOutcome> {
    let fixture = PageFixture::load(&args.page)
        .with_context(|| format!("Failed to load page fixture {}", args.page.display()))?;

    let client = HttpGenerationClient::new(config.generation.endpoint.clone())
        .context("Failed to build generation client")?;
    let notifier = Arc::new(CollectingNotifier::default());
    let runtime = AssistRuntime::new(
        Page::from_specs(&fixture.body),
        config,
        Arc::new(client),
        notifier.clone(),
    );

    drive(&runtime, &fixture.compose, args.settings(), args.timeout).await?;

    Ok(ReplayOutcome {
        compose_text: runtime.compose_text().unwrap_or_default(),
        alerts: notifier.take(),
    })
}

/// Runs one reply session the way a user would.
///
/// An empty `compose` means the page already shows a compose surface, so the
/// control is injected right away instead of waiting for the watcher.
pub async fn drive(
    runtime: &AssistRuntime,
    compose: &[NodeSpec],
    settings: GenerationSettings,
    timeout: Duration,
) -> Result<()> {
    let watch = runtime.start();
    let result = run_session(runtime, compose, settings, timeout).await;
    watch.abort();
    result
}

async fn run_session(
    runtime: &AssistRuntime,
    compose: &[NodeSpec],
    settings: GenerationSettings,
    timeout: Duration,
) -> Result<()> {
    let control = if compose.is_empty() {
        match runtime.inject_now() {
            InjectOutcome::Injected(node) => node,
            InjectOutcome::ToolbarMissing => bail!("page has no compose toolbar"),
        }
    } else {
        runtime.page().mutate(|tree| {
            let body = tree.body();
            for spec in compose {
                spec.build_into(tree, body);
            }
        });
        wait_for(timeout, || runtime.controls().first().copied())
            .await
            .context("Reply control was never injected")?
    };
    info!(control = %control, "clicking reply control");

    runtime.page().click(control);
    let surface = runtime
        .controller()
        .surface()
        .context("Clicking the control did not open a settings surface")?;
    surface.set_settings(settings);
    surface.submit();
    debug!(frame = %surface.frame(), tone = settings.tone.name(), "settings submitted");

    wait_for(timeout, || {
        runtime.controller().active_session().is_none().then_some(())
    })
    .await
    .context("Reply session did not finish")
}

async fn wait_for<T>(timeout: Duration, mut probe: impl FnMut() -> Option<T>) -> Result<T> {
    tokio::time::timeout(timeout, async {
        loop {
            if let Some(value) = probe() {
                return value;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .map_err(|_| anyhow!("timed out after {}", humantime::format_duration(timeout)))
}
