use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use feedboard::config::Config;
use feedboard::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "feedboard",
    version,
    about = "Aggregate RSS/Atom feeds into a static site and a combined feed"
)]
struct Args {
    /// Configuration file (optional; defaults apply when missing)
    #[arg(long, value_name = "FILE", default_value = "feedboard.toml")]
    config: PathBuf,

    /// Feed source list, overriding `feeds_file`
    #[arg(long, value_name = "FILE")]
    feeds: Option<PathBuf>,

    /// Output directory, overriding `output_dir`
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Items per page, overriding `page_size`
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(feeds) = &self.feeds {
            config.feeds_file = feeds.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "feedboard=debug" } else { "feedboard=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let report = pipeline::run(&config, Utc::now())
        .await
        .context("Site build failed")?;

    for failure in &report.failed {
        eprintln!("warning: {} ({}): {}", failure.display_name, failure.url, failure.error);
    }
    for defect in &report.defects {
        eprintln!("warning: {defect}");
    }
    println!(
        "Built {} page(s) with {} item(s) from {} source(s) ({} failed) into {}",
        report.pages,
        report.items,
        report.sources,
        report.failed.len(),
        config.output_dir.display()
    );

    Ok(())
}
