//! The logger facade and its process-wide lifecycle.
//!
//! [`Logger`] bundles four emitters (debug, error, info, warn) over a sink
//! tagged with a source identifier. Each emitter writes interpolated
//! messages through [`Emitter::emit`] and instruments functions through
//! [`Emitter::wrap`].
//!
//! Loggers can be built directly from a sink handle with [`Logger::new`],
//! or from the process-wide root installed by [`initialize`]:
//!
//! ```rust,ignore
//! logweave_core::initialize(&LoggerConfig::default())?;
//! let log = logweave_core::get_logger(file!())?;
//! logweave_core::emit!(log.info(), "started with ", workers, " workers")?;
//! ```

use std::sync::{Arc, OnceLock};

use crate::config::LoggerConfig;
use crate::emitter::{Emitter, SandboxProbe};
use crate::error::{LogError, LogResult};
use crate::level::Level;
use crate::logging::{ensure_log_directory, init_structured_logging};
use crate::sink::{LogSink, TracingSink};

/// Four leveled emitters over one source-tagged sink.
#[derive(Clone, Debug)]
pub struct Logger {
    source: Arc<str>,
    sink: Arc<dyn LogSink>,
    debug: Emitter,
    error: Emitter,
    info: Emitter,
    warn: Emitter,
}

impl Logger {
    /// Logger over a child of `parent` tagged with `source`.
    pub fn new(parent: &Arc<dyn LogSink>, source: &str) -> Self {
        Self::with_sandbox(parent, source, SandboxProbe::default())
    }

    pub fn with_sandbox(parent: &Arc<dyn LogSink>, source: &str, sandbox: SandboxProbe) -> Self {
        let sink = parent.child(source);
        let emitter = |level| Emitter::new(Arc::clone(&sink), level, sandbox.clone());
        Self {
            source: Arc::from(source),
            debug: emitter(Level::Debug),
            error: emitter(Level::Error),
            info: emitter(Level::Info),
            warn: emitter(Level::Warn),
            sink,
        }
    }

    pub fn debug(&self) -> &Emitter {
        &self.debug
    }

    pub fn error(&self) -> &Emitter {
        &self.error
    }

    pub fn info(&self) -> &Emitter {
        &self.info
    }

    pub fn warn(&self) -> &Emitter {
        &self.warn
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current threshold of this logger's sink.
    pub fn level(&self) -> Level {
        self.sink.threshold()
    }

    /// Change the threshold; takes effect on the next emission.
    pub fn set_level(&self, level: Level) {
        self.sink.set_threshold(level);
    }
}

struct Root {
    sink: Arc<dyn LogSink>,
    sandbox: SandboxProbe,
}

static ROOT: OnceLock<Root> = OnceLock::new();

/// Sets up the process-wide root logger from `config`.
///
/// Installs the `tracing` subscriber (unless one is already present),
/// prepares the log directory outside sandbox mode, and stores a
/// [`TracingSink`] at `config.level` as the root. Must run before
/// [`get_logger`]; a second call fails with [`LogError::AlreadyInitialized`].
pub fn initialize(config: &LoggerConfig) -> LogResult<()> {
    if ROOT.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let sandbox = SandboxProbe::from_env_var(config.sandbox_env.as_str());
    init_structured_logging(config);
    if config.create_log_dir && !sandbox.is_active() {
        ensure_log_directory(&config.log_dir)?;
    }

    initialize_with_sink(Arc::new(TracingSink::new(config.level)), sandbox)
}

/// Installs an arbitrary sink as the process-wide root.
pub fn initialize_with_sink(sink: Arc<dyn LogSink>, sandbox: SandboxProbe) -> LogResult<()> {
    ROOT.set(Root { sink, sandbox })
        .map_err(|_| LogError::AlreadyInitialized)
}

/// Logger for `source` under the process-wide root.
pub fn get_logger(source: &str) -> LogResult<Logger> {
    let root = ROOT.get().ok_or(LogError::Uninitialized)?;
    Ok(Logger::with_sandbox(&root.sink, source, root.sandbox.clone()))
}

pub fn is_initialized() -> bool {
    ROOT.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::WrapOptions;
    use crate::test_support::RecordingSink;

    fn logger(threshold: Level) -> (Arc<RecordingSink>, Logger) {
        let sink = RecordingSink::new(threshold);
        let parent: Arc<dyn LogSink> = sink.clone();
        let logger = Logger::with_sandbox(&parent, "logger_test.rs", SandboxProbe::disabled());
        (sink, logger)
    }

    #[test]
    fn test_emitters_are_bound_to_their_levels() {
        let (sink, log) = logger(Level::Trace);
        crate::emit!(log.debug(), "d").unwrap();
        crate::emit!(log.info(), "i").unwrap();
        crate::emit!(log.warn(), "w").unwrap();
        crate::emit!(log.error(), "e").unwrap();

        let levels: Vec<Level> = sink.records().into_iter().map(|(level, _)| level).collect();
        assert_eq!(levels, vec![Level::Debug, Level::Info, Level::Warn, Level::Error]);
    }

    #[test]
    fn test_same_emitter_serves_both_modes() {
        let (sink, log) = logger(Level::Info);
        let answer: i32 = 42;
        assert_eq!(
            crate::emit!(log.info(), "answer is ", answer, "").unwrap(),
            "answer is 42"
        );

        let negate = log.info().wrap(|x: i32| -x, "negate", WrapOptions::new());
        assert_eq!(negate.call(5).unwrap(), -5);
        assert_eq!(sink.records().len(), 3);
    }

    #[test]
    fn test_set_level_mutes_debug() {
        let (sink, log) = logger(Level::Debug);
        assert_eq!(log.level(), Level::Debug);

        log.set_level(Level::Warn);
        assert_eq!(crate::emit!(log.debug(), "hidden").unwrap(), "");
        assert_eq!(crate::emit!(log.warn(), "shown").unwrap(), "shown");
        assert_eq!(sink.messages(), vec!["shown"]);
    }

    #[test]
    fn test_source_is_kept() {
        let (_, log) = logger(Level::Info);
        assert_eq!(log.source(), "logger_test.rs");
    }
}
