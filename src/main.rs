use actions::ActionRegistry;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use configuration::{LogLevel, init_logging, load_configuration};
use database::{RepositoryCollection, RepositoryRegistry};
use engine::{ActionOutcome, Engine, RunPolicy, RunReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The main entry point for the sqlexec application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Connection strings may reference secrets kept in a .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = init_logging(cli.log_level, cli.log_dir.as_deref())
        .context("Failed to initialize logging")?;

    match cli.command {
        Commands::Run(args) => handle_run(args).await,
        Commands::Validate { config } => handle_validate(config),
        Commands::Providers => {
            handle_providers();
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Runs declarative SQL action documents.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Minimum level of log messages. `RUST_LOG` takes precedence when set.
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Also write daily-rotated log files into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and run every action of a document, in order.
    Run(RunArgs),
    /// Load and validate a document without connecting to anything.
    Validate {
        /// Path to the YAML action document.
        config: PathBuf,
    },
    /// List the connection providers and action types this build supports.
    Providers,
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the YAML action document.
    config: PathBuf,

    /// Keep running later actions after one fails.
    #[arg(long)]
    continue_on_error: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_run(args: RunArgs) -> anyhow::Result<()> {
    let configuration = load_configuration(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let policy = RunPolicy::from_settings(&configuration.run, args.continue_on_error);

    let engine = Engine::from_configuration(&configuration, &RepositoryRegistry::with_defaults())
        .context("Failed to build actions")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Running {} action(s)...", engine.actions().len()));

    let report = engine.run(policy).await;
    spinner.finish_and_clear();

    let shutdown = engine.shutdown().await;
    print_report(&report);
    shutdown.context("Failed to close connections")?;

    if !report.succeeded() {
        bail!("{} action(s) failed", report.failures().count());
    }
    Ok(())
}

fn handle_validate(config: PathBuf) -> anyhow::Result<()> {
    let configuration = load_configuration(&config)
        .with_context(|| format!("Failed to load {}", config.display()))?;
    println!(
        "{} is valid: {} connection(s), {} action(s).",
        config.display(),
        configuration.connections.len(),
        configuration.actions.len()
    );
    Ok(())
}

fn handle_providers() {
    println!("Connection providers:");
    for provider in RepositoryRegistry::with_defaults().providers() {
        println!("  {provider}");
    }

    let actions = ActionRegistry::with_defaults(Arc::new(RepositoryCollection::new()));
    println!("Action types:");
    for action_type in actions.action_types() {
        println!("  {action_type}");
    }
}

fn print_report(report: &RunReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Action", "Type", "Status", "Rows", "Detail"]);

    for action in &report.actions {
        let (rows, detail, color) = match &action.outcome {
            ActionOutcome::Completed { rows } => (rows.to_string(), String::new(), Color::Green),
            ActionOutcome::Failed(e) => (String::from("-"), e.to_string(), Color::Red),
            ActionOutcome::Skipped => (String::from("-"), String::from("skipped"), Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&action.name),
            Cell::new(&action.action_type),
            Cell::new(action.status).fg(color),
            Cell::new(rows),
            Cell::new(detail),
        ]);
    }

    println!("{table}");
    println!(
        "Finished in {} ms, {} row(s) affected.",
        (report.finished_at - report.started_at).num_milliseconds(),
        report.total_rows()
    );
}
