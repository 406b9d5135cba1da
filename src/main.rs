use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    integrations::github::{GhCfg, GithubIssues},
    settings::{Overrides, Settings},
    sync::SyncJob,
};

mod archive;
mod error;
mod fetch;
mod integrations;
mod models;
mod render;
mod settings;
mod sync;
mod utils;

/// Mirror the open issues of a GitHub repository into a Markdown archive.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Extra configuration file, read after ./config and ./config/*
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repository to archive, as owner/repo
    #[arg(short, long)]
    repo: Option<String>,

    /// Directory the archive and index are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// GitHub token used for the API requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Stop quietly instead of failing when GitHub returns an error page
    #[arg(long)]
    lenient: bool,
}

async fn run(cli: Cli) -> anyhow::Result<usize> {
    let settings = Settings::new(Overrides {
        config: cli.config,
        repo: cli.repo,
        token: cli.token,
        output_dir: cli.output_dir,
        lenient: cli.lenient,
    })
    .context("Failed to load configuration")?;

    info!("archiving open issues of {}", settings.github.repo);

    let source = GithubIssues::new(&GhCfg {
        repo: settings.github.repo.clone(),
        token: settings.github.token.clone(),
        api_url: settings.github.api_url.clone(),
        timeout: Duration::from_secs(settings.github.timeout_secs),
    })
    .context("Failed to create GitHub client")?;

    let report = SyncJob::from(&settings)
        .run(&source)
        .await
        .with_context(|| format!("Failed to archive {}", settings.github.repo))?;

    info!(
        "{} issues fetched, {} pull requests skipped",
        report.fetched, report.pull_requests
    );
    Ok(report.archived)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(archived) => {
            println!("Synchronized {archived} articles");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
