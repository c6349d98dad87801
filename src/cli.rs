use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use cs_app::usecases::{DeleteTarget, LocalFile, ProgressCallback, UploadProgress, UploadRequest};
use cs_app::SyncOutcome;
use cs_core::{ProjectSlot, WorkType};

use crate::bootstrap::config::{
    apply_overrides, credential_from_env, default_config_path, default_data_dir, load_config,
    ConfigOverrides,
};
use crate::bootstrap::tracing::init_tracing_subscriber;
use crate::bootstrap::wiring::{wire_services, AppServices};

#[derive(Parser, Debug)]
#[command(name = "coursework-sync")]
#[command(about = "Mirror and upload CAD coursework kept in a GitHub repository", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Repository owner, overriding the config file
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Repository name, overriding the config file
    #[arg(long, global = true)]
    pub repo: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Poll the repository until Ctrl+C; press Enter to sync immediately
    Watch,
    /// Run one sync pass
    Sync {
        /// Ignore the stored marker and walk the whole tree
        #[arg(long)]
        force: bool,
    },
    /// Print the project map as JSON (cached while fresh)
    Snapshot,
    /// Upload files into one project folder
    Upload {
        /// Day number
        #[arg(long)]
        day: u32,
        /// Class work or home work
        #[arg(long = "type", value_enum)]
        kind: KindArg,
        /// Project number within the day
        #[arg(long)]
        number: u32,
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete files, given as PATH SHA pairs
    Delete {
        #[arg(required = true, value_names = ["PATH", "SHA"])]
        targets: Vec<String>,
    },
    /// Check the stored (or GITHUB_TOKEN) credential against the repository
    Validate,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    #[value(name = "CW", alias = "cw")]
    Cw,
    #[value(name = "HW", alias = "hw")]
    Hw,
}

impl From<KindArg> for WorkType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Cw => WorkType::ClassWork,
            KindArg::Hw => WorkType::HomeWork,
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let data_dir = default_data_dir();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path, &data_dir)?;
    apply_overrides(
        &mut config,
        &ConfigOverrides {
            owner: cli.owner.clone(),
            repo: cli.repo.clone(),
        },
    );

    init_tracing_subscriber(config.storage.log_dir.as_deref())?;
    info!(config = %config_path.display(), "Configuration loaded");

    if config.github.owner.is_empty() || config.github.repo.is_empty() {
        bail!(
            "repository is not configured; set [github] owner and repo in {} or pass --owner/--repo",
            config_path.display()
        );
    }

    let services = wire_services(config).await?;

    match cli.command {
        Command::Watch => run_watch(&services).await,
        Command::Sync { force } => run_sync(&services, force).await,
        Command::Snapshot => run_snapshot(&services).await,
        Command::Upload {
            day,
            kind,
            number,
            files,
        } => run_upload(&services, ProjectSlot::new(day, kind.into(), number), files).await,
        Command::Delete { targets } => run_delete(&services, &targets).await,
        Command::Validate => run_validate(&services).await,
    }
}

async fn run_watch(services: &AppServices) -> Result<()> {
    println!(
        "coursework-sync: watching {} every {}s",
        services.config.coordinates().full_name(),
        services.config.sync.interval_secs
    );
    println!("- sync now: Enter");
    println!("- stop: Ctrl+C");

    services.scheduler.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("listen for Ctrl+C")?;
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(_)) => services.scheduler.trigger(),
                Ok(None) => stdin_open = false,
                Err(err) => {
                    warn!(error = %err, "Stdin closed");
                    stdin_open = false;
                }
            },
        }
    }

    services.scheduler.stop().await?;
    Ok(())
}

async fn run_sync(services: &AppServices, force: bool) -> Result<()> {
    match services.scheduler.sync_now(force).await? {
        SyncOutcome::AlreadySyncing => println!("A sync is already running"),
        SyncOutcome::UpToDate { marker } => println!("Up to date ({marker})"),
        SyncOutcome::Updated {
            marker,
            counts,
            skipped,
        } => {
            println!(
                "Updated to {marker}: {} class work, {} home work across {} day(s)",
                counts.class_work, counts.home_work, counts.days
            );
            if skipped > 0 {
                println!("{skipped} folder(s) could not be listed; they will be retried");
            }
        }
    }
    Ok(())
}

async fn run_snapshot(services: &AppServices) -> Result<()> {
    let projects = services.fetch.execute().await?;
    let json = serde_json::to_string_pretty(&projects).context("serialize projects")?;
    println!("{json}");
    Ok(())
}

async fn run_upload(services: &AppServices, slot: ProjectSlot, paths: Vec<PathBuf>) -> Result<()> {
    adopt_env_credential(services).await?;

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = LocalFile::read(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        files.push(file);
    }

    let progress: ProgressCallback = Arc::new(|update: UploadProgress| {
        eprintln!("[{:>3}%] {}", update.percent, update.message);
    });
    let report = services
        .upload
        .execute(UploadRequest { slot, files }, Some(progress))
        .await?;

    println!("Uploaded {} file(s) to {}", report.files.len(), report.folder_path);
    for file in &report.files {
        println!("  {} ({:?}, {})", file.path, file.role, file.sha);
    }
    if report.readme.is_none() {
        println!("README could not be written; the files are in place");
    }
    println!("{}", report.folder_url);
    Ok(())
}

async fn run_delete(services: &AppServices, args: &[String]) -> Result<()> {
    adopt_env_credential(services).await?;

    let targets = parse_delete_targets(args)?;
    let report = services.delete.execute(&targets).await?;

    for path in &report.deleted {
        println!("deleted {path}");
    }
    for (path, reason) in &report.failed {
        println!("failed  {path}: {reason}");
    }
    if !report.failed.is_empty() {
        bail!("{} file(s) could not be deleted", report.failed.len());
    }
    Ok(())
}

async fn run_validate(services: &AppServices) -> Result<()> {
    let from_env = credential_from_env();
    let credential = match from_env {
        Some(credential) => credential,
        None => services.vault.require().await?,
    };

    let report = services.validate.execute(&credential).await?;
    services.vault.save(&credential).await?;

    println!(
        "Token belongs to {} with push access to {}{}",
        report.login,
        report.repository,
        if report.private { " (private)" } else { "" }
    );
    if let Some(warning) = report.warning {
        println!("warning: {warning}");
    }
    Ok(())
}

/// Store a `GITHUB_TOKEN` credential so the use cases find it in the vault.
async fn adopt_env_credential(services: &AppServices) -> Result<()> {
    if let Some(credential) = credential_from_env() {
        services.vault.save(&credential).await?;
    }
    Ok(())
}

fn parse_delete_targets(args: &[String]) -> Result<Vec<DeleteTarget>> {
    if args.len() % 2 != 0 {
        bail!("expected PATH SHA pairs, got {} argument(s)", args.len());
    }
    Ok(args
        .chunks_exact(2)
        .map(|pair| DeleteTarget {
            path: pair[0].clone(),
            sha: pair[1].clone(),
        })
        .collect())
}
