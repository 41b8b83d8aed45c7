//! subalert daemon binary.
//!
//! Reads `config.toml` (or the path given with `--config`), overlaid with
//! `SUBALERT__*` environment variables, then polls for release and identity
//! changes until interrupted.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use subalert_daemon::{Daemon, DaemonConfig};
use tokio::time::MissedTickBehavior;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "On-chain identity and release alerts")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run a single cycle and exit.
  #[arg(long)]
  once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SUBALERT").separator("__"))
    .build()
    .context("failed to read config file")?;

  let cfg: DaemonConfig = settings
    .try_deserialize()
    .context("failed to deserialise DaemonConfig")?;

  let mut daemon = Daemon::build(&cfg).await?;

  if cli.once {
    daemon.run_cycle().await;
    return Ok(());
  }

  let mut interval = tokio::time::interval(cfg.poll_interval());
  interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

  // Spawned so the handler is installed at once, not when `select!` first
  // polls this branch. An interrupt during a cycle ends the loop after it.
  let mut shutdown = tokio::spawn(tokio::signal::ctrl_c());

  tracing::info!(every = ?cfg.poll_interval(), "watching for changes");
  loop {
    tokio::select! {
      _ = interval.tick() => {
        daemon.run_cycle().await;
      }
      signal = &mut shutdown => {
        if let Ok(Err(e)) = signal {
          tracing::error!("cannot listen for interrupts: {e}");
        }
        tracing::info!("interrupted, shutting down");
        break;
      }
    }
  }

  Ok(())
}
