//! Typed error handling for logweave.
//!
//! Logging failures are returned to the caller of the logging call. They
//! are never retried and never swallowed.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for logweave operations.
#[derive(Error, Debug)]
pub enum LogError {
    /// A placeholder could be rendered neither through `Display` nor `Debug`.
    ///
    /// Both underlying failures are kept for diagnosis. `display` is `None`
    /// for composite values, which only ever go through the inspector.
    #[error(
        "could not serialize value using Display or Debug \
         (display: {}, inspect: {inspect})",
        describe_cause(.display)
    )]
    Serialization {
        display: Option<fmt::Error>,
        #[source]
        inspect: fmt::Error,
    },

    /// A logging entry point was used before [`crate::initialize`] ran.
    #[error("logger was not initialized; call logweave_core::initialize first")]
    Uninitialized,

    /// [`crate::initialize`] ran more than once.
    #[error("logger was already initialized")]
    AlreadyInitialized,

    /// Fragment and value lists do not have the interpolation shape.
    #[error("template has {fragments} fragments but {values} values (expected {} fragments)", .values + 1)]
    Template { fragments: usize, values: usize },

    /// Filesystem failure reading configuration or preparing the log directory
    #[error("Cannot prepare {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Unparseable logweave.toml
    #[error("Invalid logger configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl LogError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from building a message.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. } | Self::Template { .. })
    }

    /// Filesystem location involved in the failure.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn describe_cause(cause: &Option<fmt::Error>) -> String {
    match cause {
        Some(err) => err.to_string(),
        None => "not attempted".to_string(),
    }
}

/// Convenience type alias for logweave results.
pub type LogResult<T> = Result<T, LogError>;

/// Attaches a path to `std::io` failures.
pub trait IoResultExt<T> {
    /// Tag the error with the path being read or created.
    fn with_path(self, path: impl Into<PathBuf>) -> LogResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> LogResult<T> {
        self.map_err(|e| LogError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_io_error() {
        let err = LogError::io(
            PathBuf::from("/var/log/app"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, LogError::Io { .. }));
        assert_eq!(err.path(), Some(&PathBuf::from("/var/log/app")));
        assert!(err.to_string().contains("/var/log/app"));
    }

    #[test]
    fn test_serialization_error_keeps_both_causes() {
        let err = LogError::Serialization {
            display: Some(fmt::Error),
            inspect: fmt::Error,
        };
        assert!(err.is_serialization());
        assert!(err.source().is_some());
        let text = err.to_string();
        assert!(text.contains("display: an error occurred when formatting an argument"));
        assert!(text.contains("inspect:"));
    }

    #[test]
    fn test_serialization_error_without_display_attempt() {
        let err = LogError::Serialization {
            display: None,
            inspect: fmt::Error,
        };
        assert!(err.to_string().contains("display: not attempted"));
    }

    #[test]
    fn test_template_error_message() {
        let err = LogError::Template {
            fragments: 1,
            values: 2,
        };
        assert_eq!(
            err.to_string(),
            "template has 1 fragments but 2 values (expected 3 fragments)"
        );
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let err = result.with_path("/missing/logs").unwrap_err();
        assert!(!err.is_serialization());
        assert_eq!(err.path(), Some(&PathBuf::from("/missing/logs")));
    }
}
