//! Notifier port — external webhook triggered by rules.

/// Fire-and-forget notification of a named event.
///
/// Implementations must not block: delivery happens in the background and
/// failures are only logged.
pub trait Notifier: Send {
    fn notify(&self, event: &str);
}
