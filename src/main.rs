use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use force_transfer::config::{ConfigLoader, ConfigOverrides, ResolvedConfig};
use force_transfer::coordinator::{RunCoordinator, TracingSink};
use force_transfer::error::{ConfigError, RunError};
use force_transfer::transfer::TransferMode;
use force_transfer::tui;

#[derive(Parser, Debug)]
#[command(name = "force-transfer")]
#[command(about = "Rename and file loosely named episodes into a Season folder without metadata lookups")]
#[command(version)]
struct Cli {
    /// JSON config file (defaults to force-transfer.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the episodes to organize
    #[arg(long)]
    source: Option<PathBuf>,

    /// Library root; episodes land in <target>/<name>/Season <n>
    #[arg(long)]
    target: Option<PathBuf>,

    /// Series name used for the folder and the file names
    #[arg(long)]
    name: Option<String>,

    /// Season number; anything unparseable means season 1
    #[arg(long)]
    season: Option<String>,

    /// softlink, link, copy or move
    #[arg(long)]
    mode: Option<TransferMode>,

    /// Run even if the config file is not armed with enabled + run_now
    #[arg(long)]
    now: bool,

    /// Print the planned transfers without touching anything
    #[arg(long)]
    dry_run: bool,

    /// Open the interactive form
    #[arg(long)]
    tui: bool,
}

fn main() -> ExitCode {
    let result = tokio::runtime::Runtime::new()
        .context("failed to start the tokio runtime")
        .and_then(|runtime| runtime.block_on(run()));

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        return ExitCode::from(map_exit_code(&err));
    }
    ExitCode::SUCCESS
}

fn map_exit_code(err: &anyhow::Error) -> u8 {
    if let Some(run) = err.downcast_ref::<RunError>() {
        if run.is_configuration() {
            return 2;
        }
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    1
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.tui);

    let overrides = ConfigOverrides {
        source_path: cli.source.clone(),
        target_path: cli.target.clone(),
        media_name: cli.name.clone(),
        season: cli.season.clone(),
        mode: cli.mode,
    };
    let resolved = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;

    if cli.tui {
        if let Some(summary) = tui::run_tui(resolved.run).await? {
            println!("{}", summary.notification_text());
        }
        return Ok(());
    }

    if cli.dry_run {
        return print_plan(&resolved);
    }

    // an ad hoc invocation without a config file always runs
    let forced = cli.now || resolved.origin.is_none();
    if !resolved.trigger.should_fire(forced) {
        tracing::info!("config is not armed (enabled + run_now); pass --now to run anyway");
        return Ok(());
    }

    tracing::info!(media = %resolved.run.media_name, "starting forced transfer");
    let config = resolved.run.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        RunCoordinator::new(config, &TracingSink).run()
    })
    .await
    .context("transfer task panicked")?;

    // the switch flips back off even when the run was rejected
    if resolved.trigger.should_fire(false) {
        if let Some(path) = &resolved.origin {
            ConfigLoader::reset_run_now(path)
                .with_context(|| format!("failed to reset run_now in {}", path.display()))?;
        }
    }

    let report = outcome?;
    println!("{}", report.summary.notification_text());
    Ok(())
}

fn print_plan(resolved: &ResolvedConfig) -> Result<()> {
    let plan = RunCoordinator::new(resolved.run.clone(), &TracingSink).plan()?;

    for (assignment, job) in plan.assignments.iter().zip(&plan.jobs) {
        let origin = if assignment.inferred { "fallback" } else { "filename" };
        println!(
            "{} -> {} [E{:02} from {}]",
            assignment.source.name,
            job.destination.display(),
            assignment.episode,
            origin
        );
    }
    println!(
        "{} file(s) would be handled with {}",
        plan.jobs.len(),
        resolved.run.mode
    );
    Ok(())
}

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
