/// Trait for surfacing problems to the person watching the stream
pub trait Notifier {
    fn error(&self, message: &str);
}

/// Sends notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}
