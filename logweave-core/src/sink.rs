//! The leveled logger that finished messages are handed to.
//!
//! The core never formats records itself beyond the single message string.
//! Level storage, output formatting and contextual tagging belong to the
//! sink.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::level::Level;

/// Capability to write a message at a level, with a queryable threshold.
pub trait LogSink: Send + Sync {
    /// Write one finished message.
    fn write(&self, level: Level, message: &str);

    /// Current minimum level; anything less severe is dropped.
    fn threshold(&self) -> Level;

    fn set_threshold(&self, level: Level);

    /// A sink of the same kind tagged with `source`.
    fn child(&self, source: &str) -> Arc<dyn LogSink>;
}

impl fmt::Debug for dyn LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("threshold", &self.threshold())
            .finish_non_exhaustive()
    }
}

/// Sink that forwards every message as a `tracing` event.
///
/// The source tag travels in the `file` field. `fatal` has no `tracing`
/// counterpart and is emitted at `ERROR` with `fatal = true`.
#[derive(Debug)]
pub struct TracingSink {
    threshold: AtomicU8,
    source: Option<Arc<str>>,
}

impl TracingSink {
    pub fn new(threshold: Level) -> Self {
        Self {
            threshold: AtomicU8::new(threshold.severity()),
            source: None,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl LogSink for TracingSink {
    fn write(&self, level: Level, message: &str) {
        let file = self.source.as_deref().unwrap_or("");
        match level {
            Level::Trace => trace!(file, "{}", message),
            Level::Debug => debug!(file, "{}", message),
            Level::Info => info!(file, "{}", message),
            Level::Warn => warn!(file, "{}", message),
            Level::Error => error!(file, "{}", message),
            Level::Fatal => error!(file, fatal = true, "{}", message),
        }
    }

    fn threshold(&self) -> Level {
        Level::from_severity(self.threshold.load(Ordering::Relaxed)).unwrap_or(Level::Trace)
    }

    fn set_threshold(&self, level: Level) {
        self.threshold.store(level.severity(), Ordering::Relaxed);
    }

    fn child(&self, source: &str) -> Arc<dyn LogSink> {
        Arc::new(Self {
            threshold: AtomicU8::new(self.threshold.load(Ordering::Relaxed)),
            source: Some(Arc::from(source)),
        })
    }
}
