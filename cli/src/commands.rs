//! Subcommands.
//!
//! Explicit flags win over `[fanout]` / `[github]` config values, which win
//! over built-in defaults.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::{Builder, Runtime};

use kata_config::KataConfig;
use kata_fanout::{
    TickerConfig, async_comprehension, measure_runtime, measure_time, task_wait_n, wait_n,
};
use kata_github::{GithubOrgClient, HttpFetcher, HttpFetcherConfig};
use kata_types::MaxDelay;

#[derive(Debug, Parser)]
#[command(name = "kata")]
#[command(about = "Concurrent delay fan-out and GitHub org listing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run N random waits concurrently and print the delays in completion order
    WaitN {
        #[command(flatten)]
        fanout: FanoutArgs,
        /// Spawn every wait as its own task instead of polling them inline
        #[arg(long)]
        spawn: bool,
    },
    /// Time one fan-out cycle and print the average seconds per task
    Measure {
        #[command(flatten)]
        fanout: FanoutArgs,
    },
    /// Collect ten paced random values, then time four collections side by side
    Comprehension,
    /// List an organisation's public repositories
    Repos {
        org: String,
        /// Only repositories with this license key (e.g. apache-2.0)
        #[arg(long)]
        license: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct FanoutArgs {
    /// Number of concurrent waits
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
    /// Upper bound on each wait, in seconds
    #[arg(short, long)]
    pub max_delay: Option<MaxDelay>,
}

impl FanoutArgs {
    fn resolve(self, config: &KataConfig) -> (usize, MaxDelay) {
        (
            self.count.unwrap_or_else(|| config.fanout_count()),
            self.max_delay.unwrap_or_else(|| config.max_delay()),
        )
    }
}

fn runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

pub fn run(cli: Cli, config: &KataConfig, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::WaitN { fanout, spawn } => {
            let (n, max_delay) = fanout.resolve(config);
            tracing::info!(n, %max_delay, spawn, "wait-n");
            let delays = if spawn {
                runtime()?.block_on(task_wait_n(n, max_delay))?
            } else {
                runtime()?.block_on(wait_n(n, max_delay))
            };
            for delay in delays {
                writeln!(out, "{delay:.6}")?;
            }
        }
        Command::Measure { fanout } => {
            let (n, max_delay) = fanout.resolve(config);
            tracing::info!(n, %max_delay, "measure");
            let per_task = measure_time(n, max_delay)?;
            writeln!(out, "{:.6}", per_task.as_secs_f64())?;
        }
        Command::Comprehension => {
            let ticker = TickerConfig::default();
            let (values, elapsed) = runtime()?.block_on(async {
                let values = async_comprehension(ticker).await;
                (values, measure_runtime(ticker).await)
            });
            for value in values {
                writeln!(out, "{value:.6}")?;
            }
            writeln!(out, "elapsed: {:.3}s", elapsed.as_secs_f64())?;
        }
        Command::Repos { org, license } => {
            let github = config.github.as_ref();
            let fetcher = HttpFetcher::new(&HttpFetcherConfig {
                timeout: github.and_then(|g| g.timeout()),
                token: github.and_then(|g| g.resolved_token()),
            })?;
            let mut client = GithubOrgClient::with_fetcher(&org, Arc::new(fetcher));
            if let Some(base) = github.and_then(|g| g.api_base.clone()) {
                client = client.with_api_base(base);
            }

            let names = runtime()?
                .block_on(client.public_repos(license.as_deref()))
                .with_context(|| format!("failed to list repos for {org}"))?;
            for name in names {
                writeln!(out, "{name}")?;
            }
        }
    }
    Ok(())
}
