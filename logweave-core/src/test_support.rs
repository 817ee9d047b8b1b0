//! Shared helpers for the unit tests.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use crate::level::Level;
use crate::sink::LogSink;

static ENV_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Environment variable name no other test uses.
pub fn unique_env_var(prefix: &str) -> String {
    let id = ENV_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!(
        "LOGWEAVE_TEST_{}_{}_{}",
        prefix.to_uppercase(),
        std::process::id(),
        id
    )
}

/// A value whose `Display` and `Debug` both fail.
pub struct Exploding;

impl fmt::Display for Exploding {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

impl fmt::Debug for Exploding {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

/// Sink that keeps every message in memory. Children share the buffer.
pub struct RecordingSink {
    threshold: AtomicU8,
    records: Arc<Mutex<Vec<(Level, String)>>>,
}

impl RecordingSink {
    pub fn new(threshold: Level) -> Arc<Self> {
        Arc::new(Self {
            threshold: AtomicU8::new(threshold.severity()),
            records: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|(_, message)| message).collect()
    }
}

impl LogSink for RecordingSink {
    fn write(&self, level: Level, message: &str) {
        self.records
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }

    fn threshold(&self) -> Level {
        Level::from_severity(self.threshold.load(Ordering::SeqCst)).unwrap_or(Level::Trace)
    }

    fn set_threshold(&self, level: Level) {
        self.threshold.store(level.severity(), Ordering::SeqCst);
    }

    fn child(&self, _source: &str) -> Arc<dyn LogSink> {
        Arc::new(Self {
            threshold: AtomicU8::new(self.threshold.load(Ordering::SeqCst)),
            records: Arc::clone(&self.records),
        })
    }
}
