//! steamwatch - Steam download progress monitor
//!
//! Main entry point for the command-line application.
//!
//! # Execution Flow
//!
//! 1. Parse the command line ([`Cli`])
//! 2. Load `steamwatch.yaml` from the config directory, layered with
//!    `STEAMWATCH_*` environment variables, then apply CLI overrides
//! 3. Initialize logging → `<log_dir>/steamwatch.<date>`
//! 4. Resolve the Steam install root (explicit path, registry, conventional
//!    directories)
//! 5. Run the [`MonitorLoop`] on a current-thread tokio runtime until the
//!    duration elapses or Ctrl-C is pressed
//!
//! # Exit Status
//!
//! - `0` when monitoring completed or was stopped by the operator
//! - `1` when no Steam installation could be found

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use std::future::Future;
use std::process::ExitCode;
use steamwatch::services::{LocationResolver, SystemStore};
use steamwatch::ui::ConsoleReporter;
use steamwatch::{
    APP_NAME, ConfigManager, MonitorConfig, MonitorLoop, MonitorOutcome, Schedule, StrategyKind,
    VERSION, build_strategy,
};

/// Watch Steam download progress from the command line.
#[derive(Debug, Parser)]
#[command(name = "steamwatch", version, about)]
struct Cli {
    /// Total monitoring time in minutes
    #[arg(short, long)]
    duration: Option<u64>,

    /// Seconds between two checks
    #[arg(short, long)]
    interval: Option<u64>,

    /// Detection strategy
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Steam install directory; skips automatic discovery
    #[arg(long)]
    steam_path: Option<String>,

    /// Directory holding steamwatch.yaml
    #[arg(long, default_value = ".")]
    config_dir: Utf8PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Also write log output to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Run a single check and exit
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(duration) = self.duration {
            config.duration_minutes = duration;
        }
        if let Some(interval) = self.interval {
            config.interval_seconds = interval;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(steam_path) = &self.steam_path {
            config.steam_path = Some(steam_path.clone());
        }
        if self.debug {
            config.debug_mode = true;
        }
    }

    fn schedule(&self, config: &MonitorConfig) -> Schedule {
        if self.once {
            Schedule::once()
        } else {
            Schedule::new(config.duration(), config.interval())
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let mut config = config_manager.load_monitor_config()?;
    cli.apply(&mut config);

    let _guard = steamwatch::logging::setup_logging_with_console(
        &config.log_dir,
        APP_NAME,
        config.debug_mode,
        cli.verbose,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    if config_manager.config_path().exists() {
        tracing::info!("Loaded monitor config from {}", config_manager.config_path());
    } else {
        tracing::info!(
            "Config file not found at {}, using defaults",
            config_manager.config_path()
        );
    }
    tracing::info!(
        "Config: strategy={}, duration={}m, interval={}s, once={}",
        config.strategy,
        config.duration_minutes,
        config.interval_seconds,
        cli.once
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let install_root = resolve_install_root(&config);
    let kind = config.strategy;
    let mut monitor = MonitorLoop::new(install_root, cli.schedule(&config), |root| {
        build_strategy(kind, root)
    });

    let mut reporter = ConsoleReporter::new(std::io::stdout());
    let outcome = runtime.block_on(async {
        // Registered before the first poll so an early Ctrl-C is caught too
        let shutdown = shutdown_signal();
        monitor.run(&mut reporter, shutdown).await
    });

    monitor.metrics().log_summary();
    tracing::info!("Monitor finished: {:?}", outcome);

    Ok(match outcome {
        MonitorOutcome::InstallNotFound => ExitCode::FAILURE,
        MonitorOutcome::Completed { .. } | MonitorOutcome::Interrupted { .. } => {
            ExitCode::SUCCESS
        }
    })
}

/// The configured path when it exists, automatic discovery otherwise.
fn resolve_install_root(config: &MonitorConfig) -> Option<Utf8PathBuf> {
    if let Some(path) = config.steam_path.as_deref().map(str::trim) {
        let root = Utf8PathBuf::from(path);
        if !path.is_empty() && root.exists() {
            tracing::info!("Using configured Steam install root: {}", root);
            return Some(root);
        }
        tracing::warn!("Configured Steam path {} does not exist, probing instead", root);
    }

    let store = SystemStore::new();
    LocationResolver::new(&store).resolve()
}

/// Resolves on Ctrl-C. The handler is installed when this is called, not
/// when the future is first polled. If it cannot be installed the future
/// never resolves, and the monitor simply runs to its deadline.
fn shutdown_signal() -> impl Future<Output = ()> {
    let interrupt = listen_for_interrupt();
    async move {
        let Some(mut interrupt) = interrupt else {
            return std::future::pending().await;
        };
        if interrupt.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
        tracing::info!("Interrupt received");
    }
}

#[cfg(unix)]
fn listen_for_interrupt() -> Option<tokio::signal::unix::Signal> {
    use tokio::signal::unix::{SignalKind, signal};

    signal(SignalKind::interrupt())
        .inspect_err(|e| tracing::warn!("Failed to listen for Ctrl-C: {}", e))
        .ok()
}

#[cfg(windows)]
fn listen_for_interrupt() -> Option<tokio::signal::windows::CtrlC> {
    tokio::signal::windows::ctrl_c()
        .inspect_err(|e| tracing::warn!("Failed to listen for Ctrl-C: {}", e))
        .ok()
}
