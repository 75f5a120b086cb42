//! Logging capability consumed by the client.
//!
//! The client reports retries and terminal failures through a [`Logger`]
//! supplied at construction. [`TracingLogger`] is used when none is given.

/// A sink for the messages the client emits while executing calls.
///
/// # Examples
///
/// ```
/// use blnk_http::Logger;
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn info(&self, message: &str) {
///         eprintln!("[info] {message}");
///     }
///
///     fn error(&self, message: &str) {
///         eprintln!("[error] {message}");
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Records an informational message.
    fn info(&self, message: &str);

    /// Records an error message.
    fn error(&self, message: &str);
}

/// Forwards messages to the `tracing` ecosystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "blnk_http", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "blnk_http", "{}", message);
    }
}
