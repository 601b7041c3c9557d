//! pixtrace - image authenticity forensics CLI
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, bad policy, write failure)

mod cli;

use anyhow::{Context, Result};
use cli::Args;
use pixtrace::{render_batch, render_report, ForensicEngine, ForensicPolicy, ReportFormat};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse_args();

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);
    info!("pixtrace v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("Analysis failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: write the default policy as .pixtrace.toml
fn handle_init_config() -> Result<()> {
    let path = Path::new(".pixtrace.toml");
    if path.exists() {
        anyhow::bail!(".pixtrace.toml already exists. Remove it first or edit it manually.");
    }

    let content = ForensicPolicy::default_toml()?;
    std::fs::write(path, content).context("Failed to write .pixtrace.toml")?;

    println!("Created .pixtrace.toml with default settings.");
    println!("Edit it to tune band tables, fusion weights and producers.");
    Ok(())
}

/// RUST_LOG wins over -v when set
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// `--config`, then `.pixtrace.toml` / `pixtrace.toml` in the working directory
fn load_policy(args: &Args) -> Result<ForensicPolicy> {
    let mut policy = match &args.config {
        Some(path) => ForensicPolicy::from_file(path)
            .with_context(|| format!("Failed to load policy {}", path.display()))?,
        None => ForensicPolicy::from_dir_or_default(Path::new(".")),
    };

    if let Some(mode) = args.mode {
        policy.fusion.mode = mode.into();
    }
    if args.model {
        policy.model.enabled = true;
    }
    Ok(policy)
}

fn run(args: &Args) -> Result<()> {
    let path = args.path.as_deref().context("No input path given")?;
    let engine = ForensicEngine::try_new(load_policy(args)?).context("Invalid policy")?;

    let format: ReportFormat = args.format.into();
    let rendered = if path.is_dir() {
        let results = engine
            .analyze_directory(path)
            .with_context(|| format!("Failed to analyze directory {}", path.display()))?;
        render_batch(&results, format)?
    } else {
        let report = engine
            .analyze(path)
            .with_context(|| format!("Failed to analyze {}", path.display()))?;
        render_report(&report, format)?
    };

    match &args.output {
        Some(out) => {
            std::fs::write(out, &rendered).with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Report written to {}", out.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
