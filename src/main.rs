//! # sitemeta CLI Application
//!
//! Command-line entry point for one scheduled pass over a static site.
//!
//! ## Subcommands
//!
//! - `run`: Full pipeline against the configured repository
//! - `merge`: Offline merge of a plan into a local HTML file
//! - `sitemap`: Print the sitemap a run would publish today
//!
//! Configuration comes from the environment, seeded from `.env` when the file
//! exists. A missing required variable exits with status 1.

mod telemetry;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sitemeta::config::{ConfigError, SiteConfig};
use sitemeta::model::completer_from_config;
use sitemeta::notify::notifiers_from_config;
use sitemeta::pipeline::{Pipeline, RunReport, sitemap_urls};
use sitemeta::plan::EditPlan;
use sitemeta::sitemap::build_sitemap;
use sitemeta::source::GitHubClient;
use std::path::PathBuf;
use telemetry::OtelGuard;
use tracing::{error, info, instrument};

#[derive(Parser)]
#[command(author, version, about = "Keeps a static site's head metadata, sitemap and search-engine submissions current", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a plan to the configured page, publish, and notify search engines
    Run(RunArgs),

    /// Merge a plan into a local HTML file without touching the network
    Merge(MergeArgs),

    /// Print the sitemap for a plan
    Sitemap(SitemapArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Edit plan (JSON)
    #[arg(short, long, default_value = "plan.json")]
    plan: PathBuf,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Edit plan (JSON)
    #[arg(short, long, default_value = "plan.json")]
    plan: PathBuf,

    /// HTML file to merge into
    #[arg(short, long, required = true)]
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SitemapArgs {
    /// Edit plan (JSON)
    #[arg(short, long, default_value = "plan.json")]
    plan: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let _otel: Option<OtelGuard> = telemetry::init_tracing_subscriber()?;

    match cli.command {
        Some(Commands::Run(args)) => {
            let config = load_config();
            run_command(&config, args).await?;
        }
        Some(Commands::Merge(args)) => {
            merge_command(args).await?;
        }
        Some(Commands::Sitemap(args)) => {
            let config = load_config();
            sitemap_command(&config, args)?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["--help"]);
        }
    }

    Ok(())
}

/// Load configuration or exit with status 1
fn load_config() -> SiteConfig {
    match SiteConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::Missing(names)) => {
            error!("Missing required configuration: {}", names.join(", "));
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[instrument(skip(config))]
async fn run_command(config: &SiteConfig, args: RunArgs) -> anyhow::Result<()> {
    let plan = EditPlan::load(&args.plan)
        .with_context(|| format!("Failed to load plan {}", args.plan.display()))?;

    let store = GitHubClient::from_config(config)?;
    let completer = config.llm.as_ref().map(completer_from_config);
    let notifiers = notifiers_from_config(config);

    let mut pipeline = Pipeline::new(config, &store).with_notifiers(&notifiers);
    if let Some(completer) = completer.as_deref() {
        pipeline = pipeline.with_completer(completer);
    }

    let report = pipeline.run(&plan).await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Published {} files", report.published.len());
    for artifact in &report.published {
        println!("  {:?} {}", artifact.action, artifact.path);
    }
    match report.deployed {
        Some(true) => println!("Deployment triggered"),
        Some(false) => println!("Deployment hook failed"),
        None => {}
    }
    for notification in &report.notifications {
        println!("{}: {:?}", notification.endpoint, notification.outcome);
    }
}

#[instrument]
async fn merge_command(args: MergeArgs) -> anyhow::Result<()> {
    let plan = EditPlan::load(&args.plan)
        .with_context(|| format!("Failed to load plan {}", args.plan.display()))?;
    let html = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let merged = sitemeta::merge::merge_page(&html, &plan.edits);

    match args.output {
        Some(output) => {
            tokio::fs::write(&output, merged).await?;
            info!("Wrote merged page to {}", output.display());
        }
        None => println!("{}", merged),
    }
    Ok(())
}

fn sitemap_command(config: &SiteConfig, args: SitemapArgs) -> anyhow::Result<()> {
    let plan = EditPlan::load(&args.plan)
        .with_context(|| format!("Failed to load plan {}", args.plan.display()))?;
    let urls = sitemap_urls(config, &plan);
    let xml = build_sitemap(&urls, chrono::Utc::now().date_naive())?;
    print!("{}", xml);
    Ok(())
}
