use tracing::info;

/// User-facing notification sink (a desktop dialog, a tray balloon, …).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default sink: the message only goes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!(target: "tether::notify", "{message}");
    }
}
