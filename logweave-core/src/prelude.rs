//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use logweave_core::prelude::*;
//! ```

pub use crate::error::{LogError, LogResult};
pub use crate::level::Level;

pub use crate::logger::{get_logger, initialize, Logger};

pub use crate::instrument::WrapOptions;
pub use crate::serialize::{display, inspect};

pub use crate::config::{load_config, LoggerConfig};

pub use crate::{emit, render};
