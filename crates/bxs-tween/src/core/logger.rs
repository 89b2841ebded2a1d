// core/logger.rs
//
// Four-method logging surface used by every tween error path.
// The default implementation forwards to the `log` facade so hosts pick the
// backend (env_logger, console_log, ...) the same way they do for the rest
// of their app.

use std::error::Error as StdError;

/// Sink for scheduler and tween diagnostics.
pub trait TweenLogger {
    fn log(&self, message: &str);
    fn log_warning(&self, message: &str);
    fn log_error(&self, message: &str);
    fn log_exception(&self, message: &str, error: &dyn StdError);
}

/// Forwards to `log::info!` / `log::warn!` / `log::error!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLogger;

impl TweenLogger for LogLogger {
    fn log(&self, message: &str) {
        log::info!("{}", message);
    }

    fn log_warning(&self, message: &str) {
        log::warn!("{}", message);
    }

    fn log_error(&self, message: &str) {
        log::error!("{}", message);
    }

    fn log_exception(&self, message: &str, error: &dyn StdError) {
        log::error!("{}: {}", message, error_chain(error));
    }
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(error: &dyn StdError) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
