//! logweave-core: interpolated log messages and function call instrumentation
//!
//! This library sits on top of a leveled logger (any [`LogSink`], by default
//! [`TracingSink`]) and adds two conveniences:
//!
//! - **Interpolated messages**: fragments and values are stitched into one
//!   string, every value rendered safely whatever its type.
//! - **Instrumented functions**: a wrapped closure logs its arguments on
//!   entry and its result on exit, including results of futures.
//!
//! Both are gated on the logger's current level, so a disabled line costs a
//! threshold comparison and no formatting.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use logweave_core::prelude::*;
//!
//! initialize(&LoggerConfig::default())?;
//! let log = get_logger(file!())?;
//!
//! let user = "ada";
//! emit!(log.info(), "user ", user, " logged in")?;
//!
//! let double = log.debug().wrap(|x: i32| x * 2, "double", WrapOptions::new());
//! let four = double.call(2)?;
//! ```
//!
//! # Module Organization
//!
//! - [`serialize`]: placeholder values and their Display/Debug fallback chain
//! - [`template`]: message building from fragments and values
//! - [`emitter`]: level-gated emission and sandbox echo
//! - [`instrument`]: function wrapping with argument/result/receiver selectors
//! - [`logger`]: the four-level facade and process-wide lifecycle
//! - [`sink`]: the leveled logger capability and its `tracing` implementation
//! - [`config`], [`logging`], [`error`], [`level`]: ambient plumbing
//!
//! # Cargo Features
//!
//! - `async` (default): instrumentation of future-returning functions

pub mod config;
pub mod emitter;
pub mod error;
pub mod instrument;
pub mod level;
pub mod logger;
pub mod logging;
pub mod prelude;
pub mod serialize;
pub mod sink;
pub mod template;

#[cfg(test)]
mod test_support;


// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{IoResultExt, LogError, LogResult};

// Levels and sinks
pub use level::{Level, ParseLevelError};
pub use sink::{LogSink, TracingSink};

// Serialization
pub use serialize::{display, inspect, serialize, IntoValue, Scalar, Value};
pub use template::build;

// Emission and instrumentation
pub use emitter::{Emitter, Gate, SandboxProbe, DEFAULT_SANDBOX_ENV};
pub use instrument::{Identity, Inspect, Instrumented, Mapped, Select, WrapOptions};

// Facade and lifecycle
pub use logger::{get_logger, initialize, initialize_with_sink, is_initialized, Logger};

// Configuration and process setup
pub use config::{load_config, LogFormat, LoggerConfig, CONFIG_FILE};
pub use logging::{ensure_log_directory, init_structured_logging};
