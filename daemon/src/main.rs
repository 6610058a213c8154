//! procura daemon: entry point for running the tender and bid service.

mod config;
mod directory;
mod shutdown;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use procura_lifecycle::Procurement;
use procura_rpc::{router, ApiState, RpcMetrics, RpcServer};
use procura_store_lmdb::{check_history, LmdbEnvironment};
use procura_types::SystemClock;

use crate::config::{DaemonConfig, Overrides};
use crate::directory::DirectoryFile;
use crate::shutdown::ShutdownController;

#[derive(Parser)]
#[command(name = "procura-daemon", about = "Tender and bid procurement service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "PROCURA_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the HTTP API.
    Serve,
    /// Manage users and organizations.
    Directory {
        #[command(subcommand)]
        action: DirectoryAction,
    },
    /// Verify the stored version histories.
    Check,
}

#[derive(clap::Subcommand)]
enum DirectoryAction {
    /// Load users and organizations from a TOML file.
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::resolve(cli.overrides, cli.config.as_deref())?;

    procura_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    let env = open_environment(&config)?;

    match cli.command {
        Command::Serve => serve(config, env).await?,
        Command::Directory {
            action: DirectoryAction::Import { file },
        } => {
            let directory = DirectoryFile::from_toml_file(&file)?;
            let summary = directory.import(&env.store(), &SystemClock)?;
            tracing::info!(
                users_created = summary.users_created,
                users_skipped = summary.users_skipped,
                organizations_created = summary.organizations_created,
                organizations_skipped = summary.organizations_skipped,
                responsible_links = summary.responsible_links,
                "directory import finished"
            );
        }
        Command::Check => {
            let report = check_history(&env.store())?;
            tracing::info!(
                tenders = report.tenders_checked,
                bids = report.bids_checked,
                errors = report.errors.len(),
                "integrity check finished"
            );
            for error in &report.errors {
                tracing::error!("{error}");
            }
            if !report.is_healthy() {
                anyhow::bail!("{} integrity error(s) found", report.errors.len());
            }
        }
    }

    Ok(())
}

fn open_environment(config: &DaemonConfig) -> anyhow::Result<LmdbEnvironment> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))?;
    let schema = env.ensure_schema()?;
    tracing::debug!(schema, "storage schema ready");
    Ok(env)
}

async fn serve(config: DaemonConfig, env: LmdbEnvironment) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .listen_address
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen_address))?;

    let procurement = Procurement::new(
        Arc::new(env.store()),
        Arc::new(SystemClock),
        config.tender_transitions,
    );
    let mut state = ApiState::new(
        procurement,
        Duration::from_secs(config.request_timeout_secs),
    );
    if config.enable_metrics {
        state = state.with_metrics(Arc::new(RpcMetrics::new()?));
    }

    tracing::info!(
        %addr,
        data_dir = %config.data_dir.display(),
        transitions = ?config.tender_transitions,
        metrics = config.enable_metrics,
        "starting procura daemon"
    );

    let shutdown = Arc::new(ShutdownController::new());
    let signals = Arc::clone(&shutdown);
    tokio::spawn(async move { signals.trigger_on_signal().await });

    RpcServer::new(addr)
        .start(router(state), shutdown.notified())
        .await?;

    tracing::info!("procura daemon exited cleanly");
    Ok(())
}
