//! Configuration loading from logweave.toml.

use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use crate::emitter::DEFAULT_SANDBOX_ENV;
use crate::error::{IoResultExt, LogError, LogResult};
use crate::level::Level;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE: &str = "logweave.toml";

/// Main configuration structure for logweave.toml. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Initial threshold of the root logger.
    pub level: Level,
    /// Output format of the installed subscriber.
    pub format: LogFormat,
    /// ANSI colours in pretty output.
    pub colorize: bool,
    /// Directory prepared at initialization.
    pub log_dir: PathBuf,
    /// Whether initialization creates `log_dir` when missing.
    pub create_log_dir: bool,
    /// Environment variable whose presence switches to local echo.
    pub sandbox_env: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Debug,
            format: LogFormat::Pretty,
            colorize: true,
            log_dir: PathBuf::from("logs"),
            create_log_dir: true,
            sandbox_env: DEFAULT_SANDBOX_ENV.to_string(),
        }
    }
}

/// Output format: "pretty" or "json".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Loads configuration from logweave.toml if it exists.
pub fn load_config(root: &Path) -> LogResult<Option<LoggerConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    let cfg = toml::from_str(&content)
        .map_err(|e| LogError::config(&path, format!("Invalid {}: {}", CONFIG_FILE, e)))?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn setup_temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("logweave_config_tests")
            .join(format!("{}_{}", std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = setup_temp_dir();
        assert!(load_config(&dir).unwrap().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = setup_temp_dir();
        fs::write(dir.join(CONFIG_FILE), "level = \"warn\"\nformat = \"json\"\n").unwrap();

        let cfg = load_config(&dir).unwrap().unwrap();
        assert_eq!(cfg.level, Level::Warn);
        assert_eq!(cfg.format, LogFormat::Json);
        assert!(cfg.colorize);
        assert_eq!(cfg.log_dir, PathBuf::from("logs"));
        assert_eq!(cfg.sandbox_env, DEFAULT_SANDBOX_ENV);
    }

    #[test]
    fn test_full_file() {
        let dir = setup_temp_dir();
        fs::write(
            dir.join(CONFIG_FILE),
            r#"
level = "trace"
colorize = false
log_dir = "/tmp/app-logs"
create_log_dir = false
sandbox_env = "CI_SANDBOX"
"#,
        )
        .unwrap();

        let cfg = load_config(&dir).unwrap().unwrap();
        assert_eq!(
            cfg,
            LoggerConfig {
                level: Level::Trace,
                format: LogFormat::Pretty,
                colorize: false,
                log_dir: PathBuf::from("/tmp/app-logs"),
                create_log_dir: false,
                sandbox_env: "CI_SANDBOX".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = setup_temp_dir();
        fs::write(dir.join(CONFIG_FILE), "level = \"loud\"").unwrap();

        let err = load_config(&dir).unwrap_err();
        assert!(matches!(err, LogError::Config { .. }));
        assert_eq!(err.path(), Some(&dir.join(CONFIG_FILE)));
    }
}
