//! logweave CLI - emit interpolated log lines and watch instrumented calls.
//!
//! Features:
//! - Configuration from logweave.toml with a command line level override
//! - One-off messages at any facade level
//! - A demo of sync, fallible and async function instrumentation
//! - Log directory preparation

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use logweave_core::{
    emit, ensure_log_directory, get_logger, initialize, load_config, Level, LogError, Logger,
    LoggerConfig, WrapOptions, CONFIG_FILE,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Interpolated logging and function instrumentation")]
pub struct Cli {
    /// Directory holding logweave.toml
    #[arg(long, default_value = ".")]
    config: PathBuf,

    /// Override the configured root level
    #[arg(long)]
    level: Option<Level>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one message through a logger
    Emit {
        /// Level of the message (debug, info, warn or error)
        #[arg(long, default_value = "info")]
        level: Level,

        /// Source tag attached to the logger
        #[arg(long, default_value = "logweave-cli")]
        source: String,

        /// The message text
        message: String,
    },

    /// Run a wrapped sync function and a wrapped async function
    Demo,

    /// Create the configured log directory
    PrepareDir,
}

/// Reads logweave.toml under `dir`, falling back to defaults.
fn resolve_config(dir: &Path, level: Option<Level>) -> Result<LoggerConfig> {
    let mut config = load_config(dir)
        .with_context(|| format!("Failed to load {} from: {}", CONFIG_FILE, dir.display()))?
        .unwrap_or_default();
    if let Some(level) = level {
        config.level = level;
    }
    Ok(config)
}

fn run_emit(log: &Logger, level: Level, message: &str) -> Result<()> {
    let emitter = match level {
        Level::Debug => log.debug(),
        Level::Info => log.info(),
        Level::Warn => log.warn(),
        Level::Error => log.error(),
        other => {
            return Err(anyhow!(
                "emit supports debug, info, warn and error, not {}",
                other
            ))
        }
    };

    let written = emitter.emit(&[message], &[])?;
    if written.is_empty() {
        eprintln!(
            "INFO: {} is below the current threshold ({}), nothing written",
            level,
            log.level()
        );
    }
    Ok(())
}

#[derive(Debug)]
struct Inventory {
    warehouse: &'static str,
    items: Vec<(&'static str, u32)>,
}

impl Inventory {
    fn count(&self, name: &str) -> u32 {
        self.items
            .iter()
            .find(|(item, _)| *item == name)
            .map_or(0, |(_, count)| *count)
    }
}

fn run_demo(log: &Logger) -> Result<()> {
    let workers: usize = 4;
    emit!(log.info(), "demo starting with ", workers, " workers")?;

    let add = log
        .debug()
        .wrap(|(a, b): (i64, i64)| a + b, "add", WrapOptions::new());
    let sum = add.call((40, 2))?;
    println!("add(40, 2) = {}", sum);

    let inventory = Inventory {
        warehouse: "north",
        items: vec![("bolts", 120), ("nuts", 80)],
    };
    let lookup = log.info().wrap(
        |inv: &Inventory, name: &str| inv.count(name),
        "Inventory::count",
        WrapOptions::new()
            .show_this(true)
            .receiver(|inv: &Inventory| inv.warehouse),
    );
    let bolts = lookup.call_on(&inventory, "bolts")?;
    println!("bolts in {} = {}", inventory.warehouse, bolts);

    let parse_port = log.debug().wrap(
        |text: &str| text.parse::<u16>(),
        "parse_port",
        WrapOptions::new(),
    );
    for text in ["8080", "http"] {
        match parse_port.call_fallible(text)? {
            Ok(port) => println!("parse_port({:?}) = {}", text, port),
            Err(err) => println!("parse_port({:?}) failed: {}", text, err),
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build tokio runtime")?;

    let fetch = log.info().wrap(
        |id: u32| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            vec![id, id * 10, id * 100]
        },
        "fetch_batch",
        WrapOptions::new().result(|batch: &Vec<u32>| batch.len()),
    );
    let batch = runtime.block_on(async {
        let pending = fetch.call_async(7)?;
        Ok::<_, LogError>(pending.await)
    })?;
    println!("fetch_batch(7) = {:?}", batch);

    emit!(log.info(), "demo finished, fetched ", batch, "")?;
    Ok(())
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] logweave internal error: {}", info);
    }));

    let cli = Cli::parse();
    let config = resolve_config(&cli.config, cli.level)?;

    match cli.command {
        Command::PrepareDir => {
            let created = ensure_log_directory(&config.log_dir).with_context(|| {
                format!(
                    "Failed to prepare log directory: {}",
                    config.log_dir.display()
                )
            })?;
            if created {
                println!("Created {}", config.log_dir.display());
            } else {
                println!("{} already exists", config.log_dir.display());
            }
        }
        Command::Emit {
            level,
            source,
            message,
        } => {
            initialize(&config).context("Failed to initialize logging")?;
            let log = get_logger(&source)?;
            run_emit(&log, level, &message)?;
        }
        Command::Demo => {
            initialize(&config).context("Failed to initialize logging")?;
            let log = get_logger(file!())?;
            run_demo(&log)?;
        }
    }

    Ok(())
}
