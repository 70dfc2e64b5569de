//! fieldsync daemon binary.
//!
//! Runs the batch pass over every configured project, then (under `run`)
//! starts one event-polling loop per project and keeps going until the
//! process receives a shutdown signal.
//!
//! # Commands
//!
//! - `fieldsync-syncd run`: batch pass, then event loops until Ctrl+C
//! - `fieldsync-syncd once`: batch pass only, then exit (cron-style)
//!
//! # Environment Variables
//!
//! See the [`fieldsync_syncd::config`] module for available options.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fieldsync_syncd::client::TrackerClient;
use fieldsync_syncd::config::Config;
use fieldsync_syncd::journal::Journal;
use fieldsync_syncd::pipeline::Pipeline;
use fieldsync_syncd::poller::EventPoller;

/// fieldsync daemon - syncs task notes into tracker custom fields.
///
/// Reads structured `label | value` data out of task notes and writes it
/// into the tracking service's custom fields.
#[derive(Parser, Debug)]
#[command(name = "fieldsync-syncd")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    FIELDSYNC_PROJECTS      Comma-separated name=gid pairs (required)
    FIELDSYNC_BASE_URL      Tracker API base URL
    FIELDSYNC_TOKEN_PATH    File holding the access token (default: ~/.fieldsync/token)
    FIELDSYNC_SECTION       Target board section (default: 'New Requests')
    FIELDSYNC_JOURNAL_PATH  Append-only journal file (default: ./logs/fieldsync.log)

EXAMPLES:
    # One-shot batch pass (e.g. from cron)
    export FIELDSYNC_PROJECTS='AGOL Requests=1101638289721813'
    fieldsync-syncd once

    # Batch pass, then react to task-added events until stopped
    fieldsync-syncd run
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Batch pass over every project, then per-project event loops.
    Run,

    /// Batch pass over every project, then exit.
    Once,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    match cli.command {
        Command::Run => runtime.block_on(run_daemon(true)),
        Command::Once => runtime.block_on(run_daemon(false)),
    }
}

/// Runs the batch passes and, if `poll` is set, the event loops.
async fn run_daemon(poll: bool) -> Result<()> {
    init_logging();

    info!("Starting fieldsync");

    let config = Config::from_env().context("Failed to load configuration")?;
    let token = config.load_token().context(
        "Failed to load access token. Put your personal access token on the first \
         line of the token file (see FIELDSYNC_TOKEN_PATH).",
    )?;

    info!(
        base_url = %config.base_url,
        projects = config.projects.len(),
        section = %config.section_name,
        journal = %config.journal_path.display(),
        "Configuration loaded"
    );

    let client =
        TrackerClient::new(config.base_url.clone(), token).context("Failed to build HTTP client")?;
    let journal = Journal::new(&config.journal_path);
    let pipeline = Arc::new(Pipeline::new(client, journal, config.section_name.clone()));

    let mut pollers = Vec::new();

    for project in &config.projects {
        // A failed pass must not keep the remaining projects from running.
        if let Err(error) = pipeline.process_project(project).await {
            error!(project = %project.name, %error, "Batch pass failed");
            pipeline
                .journal()
                .record(&project.name, &format!("Batch pass failed: {error}"));
        }

        if poll {
            let poller = EventPoller::new(Arc::clone(&pipeline), project.clone());
            pollers.push(tokio::spawn(poller.run()));
        }
    }

    if poll {
        info!("Event loops running. Press Ctrl+C to stop.");
        wait_for_shutdown().await;
        info!("Shutdown signal received");

        for poller in pollers {
            poller.abort();
        }
    }

    info!("fieldsync stopped");
    Ok(())
}

/// Initializes tracing with an env-filter (default level: info).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
