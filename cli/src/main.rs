//! kata CLI - binary entry point.
//!
//! ```text
//! main() -> init_tracing() -> KataConfig::load() -> Cli::parse() -> commands::run()
//! ```
//!
//! Logs go to `~/.kata/logs/kata.log` when it can be opened, otherwise to
//! stderr, so stdout only ever carries command output.

mod commands;

use std::fs::{self, File, OpenOptions};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use kata_config::KataConfig;

use crate::commands::Cli;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_kata_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_kata_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();
    let Some(path) = kata_log_file_path() else {
        return (None, warnings);
    };

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warnings.push(format!(
            "Failed to create log dir {}: {e}",
            parent.display()
        ));
        return (None, warnings);
    }

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => (Some((path, file)), warnings),
        Err(e) => {
            warnings.push(format!("Failed to open log file {}: {e}", path.display()));
            (None, warnings)
        }
    }
}

/// Next to the config file, e.g. `~/.kata/logs/kata.log`.
fn kata_log_file_path() -> Option<PathBuf> {
    let config_path = KataConfig::path()?;
    Some(config_path.parent()?.join("logs").join("kata.log"))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match KataConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("Ignoring config: {err}");
            KataConfig::default()
        }
    };

    commands::run(cli, &config, &mut stdout().lock())
}
