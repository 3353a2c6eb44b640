//! Tagsync - copy Koji tag package lists
//!
//! Usage:
//!   tagsync SOURCE_KOJI SOURCE_TAG TARGET_KOJI TARGET_TAG
//!   tagsync stream c9s-build https://cbs.centos.org/kojihub c9s-extras --dry-run
//!   tagsync koji f40 cbs c9s-testing --override-owner releng

mod progress;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagsync_core::config::ProfileLoader;
use tagsync_core::error::SyncError;
use tagsync_core::hub::HubSessionFactory;
use tagsync_core::sync::{SyncCommand, SyncOptions, SyncReport};

use crate::progress::ProgressReporter;

#[derive(Parser)]
#[command(name = "tagsync", version)]
#[command(about = "Sync packages from one Koji tag to another.", long_about = None)]
struct Cli {
    /// Source Koji hub URL or profile name.
    source_koji: String,

    /// Source Koji tag.
    source_tag: String,

    /// Target Koji hub URL or profile name.
    target_koji: String,

    /// Target Koji tag.
    target_tag: String,

    /// Override the package owner to this value.
    #[arg(long, value_name = "OWNER")]
    override_owner: Option<String>,

    /// Print the actions that would be taken without executing them.
    #[arg(long)]
    dry_run: bool,

    /// Additional Koji client config file, read after the standard ones
    #[arg(long = "config", value_name = "PATH")]
    configs: Vec<PathBuf>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagsync=info,tagsync_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to initialize logging")?;

    let cli = Cli::parse();

    let exit_code = run_sync(cli);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

fn run_sync(cli: Cli) -> i32 {
    let loader = ProfileLoader::with_defaults().with_extra_files(cli.configs);
    let cmd = SyncCommand::new(HubSessionFactory::new(loader));

    let mut options = SyncOptions::new(
        &cli.source_koji,
        cli.source_tag,
        &cli.target_koji,
        cli.target_tag,
    )
    .with_dry_run(cli.dry_run);
    if let Some(owner) = cli.override_owner {
        options = options.with_override_owner(owner);
    }

    let mut reporter = ProgressReporter::new(!cli.no_progress);
    let result = cmd.execute(&options, &mut reporter);

    match &result {
        Ok(report) if report.has_failures() => {
            warn!(
                failed = report.failures.len(),
                processed = report.processed,
                "Some packages were not synchronized"
            );
        }
        Ok(_) => {}
        Err(SyncError::Session(e)) => {
            eprintln!("{}", style(format!("Error creating Koji sessions: {e}")).red());
        }
        Err(SyncError::Listing { tag, source }) => {
            eprintln!(
                "{}",
                style(format!(
                    "Error fetching packages from source tag {tag}: {source}"
                ))
                .red()
            );
        }
    }

    exit_code(&result)
}

/// Per-package failures are reported but do not fail the run.
fn exit_code(result: &Result<SyncReport, SyncError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(SyncError::Session(_) | SyncError::Listing { .. }) => 1,
    }
}
