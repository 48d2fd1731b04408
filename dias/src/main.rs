// dias/src/main.rs

mod cli;
mod logging;
mod logic;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use colored::*;
use logic::cleanup;
use logic::config::Config;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Config problems are fatal and reported before any request is made
    let config = Config::from_file(&args.config_file, args.log_level.map(Into::into))
        .with_context(|| format!("failed to load configuration from {}", args.config_file))?;

    logging::init(
        args.effective_level(config.logging.level),
        args.silent,
        config.log_file(),
    )?;
    info!(
        "dias {} cleaning up tag `{}` in group `{}` (offline > {}h) on {}",
        env!("CARGO_PKG_VERSION"),
        config.cleanup.tag,
        config.cleanup.group,
        config.cleanup.offline_hours,
        config.appliance.fqdn
    );

    let summary = cleanup::run(&config).await?;
    info!(
        "{} devices fetched, {} candidates, {} removed, {} failed",
        summary.fetched, summary.candidates, summary.removed, summary.failed
    );

    if !args.silent {
        let marker = if summary.failed == 0 { "✓".green() } else { "✗".red() };
        println!(
            "{} Removed {} of {} offline clones ({} devices checked)",
            marker, summary.removed, summary.candidates, summary.fetched
        );
    }

    Ok(())
}
