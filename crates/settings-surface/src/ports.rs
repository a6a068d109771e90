use tracing::error;

/// User-visible, blocking notification (the page's `alert`).
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Notifier for headless runs; alerts end up in the log.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        error!(alert = message, "user notification");
    }
}
