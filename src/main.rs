//! report-reconciler CLI
//!
//! Scans a report directory, matches results to a JSON catalog and prints
//! what would be reported to the test-management system.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use report_reconciler::client::{CatalogSource, JsonCatalog, RecordingClient};
use report_reconciler::config::{ConfigLoader, env};
use report_reconciler::model::CatalogTestCase;
use report_reconciler::summary::SummaryFormatter;
use report_reconciler::util::ensure_dir_exists;
use report_reconciler::{Config, Error, ReconcilerBuilder, Result, executor};

#[derive(Parser)]
#[command(name = "report-reconciler")]
#[command(about = "Reconcile test reports with a test-management catalog", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan reports and merge them into the catalog
    Scan {
        /// Configuration file
        #[arg(short, long, default_value = "report-reconciler.toml")]
        config: PathBuf,

        /// JSON catalog of projects, plans, builds and test cases
        #[arg(long)]
        catalog: PathBuf,

        /// Override the report base directory
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Write the merged results and updated test cases as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the executions that would be reported
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the effective configuration
    Check {
        /// Configuration file
        #[arg(short, long, default_value = "report-reconciler.toml")]
        config: PathBuf,
    },

    /// Print the execution environment of one test case
    Env {
        #[arg(long)]
        catalog: PathBuf,

        #[arg(long)]
        test_case: u32,

        #[arg(long)]
        build: String,

        #[arg(long)]
        plan: String,

        #[arg(long)]
        project: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Scan {
            config,
            catalog,
            base_dir,
            output,
            dry_run,
        } => scan(config, catalog, base_dir, output, dry_run),
        Commands::Check { config } => check(config),
        Commands::Env {
            catalog,
            test_case,
            build,
            plan,
            project,
        } => print_env(catalog, test_case, &build, &plan, &project),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn scan(
    config_file: PathBuf,
    catalog_file: PathBuf,
    base_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
) -> Result<ExitCode> {
    let config = ConfigLoader::new().config_file(config_file).load()?;
    let show_notes = config.verbose;
    let catalog = JsonCatalog::from_file(&catalog_file)?;
    let mut test_cases = catalog_test_cases(&catalog, &config)?;

    let mut builder = ReconcilerBuilder::new().with_config(config);
    if let Some(dir) = base_dir {
        builder = builder.base_dir(dir);
    }
    let reconciler = builder.build()?;

    let outcome = reconciler.scan(&test_cases)?;
    outcome.apply_to(&mut test_cases);

    let formatter = SummaryFormatter::new(show_notes);
    formatter.report(&outcome);

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_exists(parent)?;
        }
        let document = serde_json::json!({
            "outcome": &outcome,
            "test-cases": &test_cases,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        tracing::info!(path = %path.display(), "wrote merged results");
    }

    if dry_run {
        let client = RecordingClient::new();
        let report = reconciler.dispatch(&outcome, &client);
        formatter.report_dispatch(&report);
    }

    if outcome.summary.files_failed > 0 || !outcome.summary.seeker_failures.is_empty() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Test cases of the configured plan, or every automated one without a plan.
fn catalog_test_cases(catalog: &JsonCatalog, config: &Config) -> Result<Vec<CatalogTestCase>> {
    match config.dispatch.plan_id {
        Some(id) => {
            let plan = catalog
                .plan_by_id(id)
                .ok_or_else(|| Error::catalog(format!("plan {} not found", id)))?;
            catalog.automated_test_cases(plan)
        }
        None => Ok(catalog.all_automated()),
    }
}

fn check(config_file: PathBuf) -> Result<ExitCode> {
    let config = ConfigLoader::new().config_file(config_file).load()?;

    println!("{}", toml::to_string_pretty(&config).map_err(|e| Error::config(e.to_string()))?);

    let overrides = env::detect_active_overrides();
    if overrides.is_empty() {
        println!("# no environment overrides active");
    } else {
        println!("# active environment overrides:");
        for (name, value) in overrides {
            println!("#   {name}={value}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_env(
    catalog_file: PathBuf,
    test_case_id: u32,
    build: &str,
    plan: &str,
    project: &str,
) -> Result<ExitCode> {
    let catalog = JsonCatalog::from_file(&catalog_file)?;
    let test_case = catalog
        .test_case(test_case_id)
        .ok_or_else(|| Error::catalog(format!("test case {} not found", test_case_id)))?;

    for (key, value) in executor::test_environment(test_case, build, plan, project) {
        println!("{key}={value}");
    }
    Ok(ExitCode::SUCCESS)
}
