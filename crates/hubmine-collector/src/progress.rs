//! Human-readable progress reporting.

use std::fmt;
use std::sync::Arc;

/// Callback receiving progress messages.
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Emits progress messages to the log and, if set, to a callback.
#[derive(Clone, Default)]
pub struct Progress {
    callback: Option<ProgressCallback>,
}

impl Progress {
    /// Report to `callback` as well as the log.
    #[must_use]
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Report to the log only.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    /// Emit one message.
    pub fn emit(&self, message: &str) {
        tracing::info!("{}", message);
        if let Some(callback) = &self.callback {
            callback(message);
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
