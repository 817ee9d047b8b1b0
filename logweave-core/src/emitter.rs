//! Level-gated emission.
//!
//! An [`Emitter`] is bound to one sink and one level. Before any value is
//! serialized it asks its [`Gate`] whether the line would be dropped; if so
//! the call costs one threshold comparison and nothing else.

use std::fmt;
use std::sync::Arc;

use crate::error::LogResult;
use crate::level::Level;
use crate::serialize::Value;
use crate::sink::LogSink;
use crate::template::build;

/// Environment variable that switches emitters to local echo by default.
pub const DEFAULT_SANDBOX_ENV: &str = "LOGWEAVE_SANDBOX";

/// Decides whether a line should be skipped.
#[derive(Clone)]
pub enum Gate {
    Fixed(bool),
    /// Re-evaluated on every emission.
    Predicate(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl Gate {
    /// Skip whenever `level` is below the sink's current threshold.
    pub fn threshold(sink: Arc<dyn LogSink>, level: Level) -> Self {
        Gate::Predicate(Arc::new(move || !level.is_enabled_at(sink.threshold())))
    }

    pub fn should_skip(&self) -> bool {
        match self {
            Gate::Fixed(skip) => *skip,
            Gate::Predicate(predicate) => predicate(),
        }
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Fixed(skip) => f.debug_tuple("Fixed").field(skip).finish(),
            Gate::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Detects sandboxed/test execution by the presence of an environment variable.
#[derive(Debug, Clone)]
pub struct SandboxProbe {
    var: Option<Arc<str>>,
}

impl SandboxProbe {
    pub fn from_env_var(var: impl Into<Arc<str>>) -> Self {
        Self {
            var: Some(var.into()),
        }
    }

    /// A probe that never reports sandbox mode.
    pub fn disabled() -> Self {
        Self { var: None }
    }

    pub fn is_active(&self) -> bool {
        self.var
            .as_deref()
            .is_some_and(|var| std::env::var_os(var).is_some())
    }
}

impl Default for SandboxProbe {
    fn default() -> Self {
        Self::from_env_var(DEFAULT_SANDBOX_ENV)
    }
}

/// Writes interpolated messages at one level, skipping disabled lines for free.
///
/// Function instrumentation lives on the same type, see
/// [`Emitter::wrap`](crate::Emitter::wrap).
#[derive(Clone)]
pub struct Emitter {
    sink: Arc<dyn LogSink>,
    level: Level,
    gate: Gate,
    sandbox: SandboxProbe,
}

impl Emitter {
    /// Emitter gated on the sink's live threshold.
    pub fn new(sink: Arc<dyn LogSink>, level: Level, sandbox: SandboxProbe) -> Self {
        let gate = Gate::threshold(Arc::clone(&sink), level);
        Self::with_gate(sink, level, gate, sandbox)
    }

    pub fn with_gate(
        sink: Arc<dyn LogSink>,
        level: Level,
        gate: Gate,
        sandbox: SandboxProbe,
    ) -> Self {
        Self {
            sink,
            level,
            gate,
            sandbox,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether a line emitted now would be written anywhere.
    ///
    /// Sandbox mode echoes every line, so it enables the emitter regardless
    /// of the gate.
    pub fn is_enabled(&self) -> bool {
        self.route() != Route::Skip
    }

    /// Build and write a message, returning it.
    ///
    /// Returns an empty string without touching `values` when the gate
    /// skips the line. Serialization failures propagate.
    pub fn emit(&self, fragments: &[&str], values: &[Value<'_>]) -> LogResult<String> {
        self.forward(self.route(), fragments, values)
    }

    /// Where a line emitted now would go. Reads the sandbox probe once.
    pub(crate) fn route(&self) -> Route {
        if self.sandbox.is_active() {
            Route::Stdout
        } else if self.gate.should_skip() {
            Route::Skip
        } else {
            Route::Sink
        }
    }

    /// Build and write a message along an already resolved route.
    pub(crate) fn forward(
        &self,
        route: Route,
        fragments: &[&str],
        values: &[Value<'_>],
    ) -> LogResult<String> {
        let message = match route {
            Route::Skip => return Ok(String::new()),
            Route::Sink | Route::Stdout => build(fragments, values)?,
        };
        if route == Route::Stdout {
            println!("{}", message);
        } else {
            self.sink.write(self.level, &message);
        }
        Ok(message)
    }
}

/// Destination of one emission, resolved before any value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Skip,
    Sink,
    /// Sandbox echo on standard output.
    Stdout,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("level", &self.level)
            .field("gate", &self.gate)
            .field("sandbox", &self.sandbox)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{display, inspect};
    use crate::test_support::{unique_env_var, Exploding, RecordingSink};

    fn emitter(sink: &Arc<RecordingSink>, level: Level) -> Emitter {
        Emitter::new(sink.clone(), level, SandboxProbe::disabled())
    }

    #[test]
    fn test_enabled_level_is_written() {
        let sink = RecordingSink::new(Level::Info);
        let text = emitter(&sink, Level::Warn)
            .emit(&["disk at ", "%"], &[display(&93)])
            .unwrap();
        assert_eq!(text, "disk at 93%");
        assert_eq!(sink.records(), vec![(Level::Warn, "disk at 93%".to_string())]);
    }

    #[test]
    fn test_skipped_level_never_serializes() {
        let sink = RecordingSink::new(Level::Info);
        let text = emitter(&sink, Level::Debug)
            .emit(&["boom ", ""], &[inspect(&Exploding)])
            .unwrap();
        assert_eq!(text, "");
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_gate_follows_runtime_threshold() {
        let sink = RecordingSink::new(Level::Error);
        let info = emitter(&sink, Level::Info);
        assert!(!info.is_enabled());

        sink.set_threshold(Level::Debug);
        assert!(info.is_enabled());
        assert_eq!(info.emit(&["now visible"], &[]).unwrap(), "now visible");
    }

    #[test]
    fn test_fixed_gate() {
        let sink = RecordingSink::new(Level::Trace);
        let muted = Emitter::with_gate(
            sink.clone(),
            Level::Error,
            Gate::Fixed(true),
            SandboxProbe::disabled(),
        );
        assert_eq!(muted.emit(&["dropped"], &[]).unwrap(), "");
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_serialization_failure_propagates() {
        let sink = RecordingSink::new(Level::Trace);
        let err = emitter(&sink, Level::Info)
            .emit(&["boom ", ""], &[inspect(&Exploding)])
            .unwrap_err();
        assert!(err.is_serialization());
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_sandbox_bypasses_gate_and_sink() {
        let var = unique_env_var("emitter");
        std::env::set_var(&var, "1");

        let sink = RecordingSink::new(Level::Fatal);
        let emitter = Emitter::new(sink.clone(), Level::Debug, SandboxProbe::from_env_var(var.as_str()));
        assert!(emitter.is_enabled());
        let text = emitter.emit(&["echoed ", ""], &[display(&1)]).unwrap();

        std::env::remove_var(&var);
        assert_eq!(text, "echoed 1");
        assert!(sink.records().is_empty());
        assert!(!emitter.is_enabled());
    }

    #[test]
    fn test_route_is_resolved_once() {
        let var = unique_env_var("route");
        let sink = RecordingSink::new(Level::Info);
        let emitter = Emitter::new(sink.clone(), Level::Info, SandboxProbe::from_env_var(var.as_str()));

        let route = emitter.route();
        assert_eq!(route, Route::Sink);

        std::env::set_var(&var, "1");
        emitter.forward(route, &["kept in sink"], &[]).unwrap();
        std::env::remove_var(&var);

        assert_eq!(sink.messages(), vec!["kept in sink"]);
    }

    #[test]
    fn test_sandbox_route_skips_sink_after_var_is_gone() {
        let var = unique_env_var("route");
        let sink = RecordingSink::new(Level::Fatal);
        let emitter = Emitter::new(sink.clone(), Level::Debug, SandboxProbe::from_env_var(var.as_str()));

        std::env::set_var(&var, "1");
        let route = emitter.route();
        std::env::remove_var(&var);

        assert_eq!(route, Route::Stdout);
        assert_eq!(emitter.forward(route, &["echo"], &[]).unwrap(), "echo");
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_disabled_probe() {
        assert!(!SandboxProbe::disabled().is_active());
    }
}
