//! tracemap - static flow maps and choropleths of country data
//!
//! This is the main entry point for the tracemap command-line tool.

use tracing::{error, info};

use tracemap::config::Command;
use tracemap::render::{choropleth_to_file, flow_map_to_file};
use tracemap::{init_tracing, log_error, Config, Result};

fn main() -> Result<()> {
    // Load configuration
    let (config, command) = Config::load().map_err(|e| {
        init_tracing("info");
        error!("Configuration error: {}", e);
        e
    })?;

    init_tracing(&config.log_level);
    info!("Starting tracemap v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    match &command {
        Command::Flow(args) => {
            let summary = flow_map_to_file(
                &config,
                &args.boundaries,
                &args.centroids,
                &args.flows,
                &args.output,
            )
            .map_err(|e| {
                log_error(&e, "flow map");
                e
            })?;
            info!(
                "Drew {} arrows ({} skipped) and {} bubbles into {}",
                summary.arrows_drawn,
                summary.arrows_skipped,
                summary.bubbles,
                args.output.display()
            );
        }
        Command::Choropleth(args) => {
            let summary = choropleth_to_file(&config, &args.boundaries, &args.indicators, &args.output)
                .map_err(|e| {
                    log_error(&e, "choropleth");
                    e
                })?;
            info!(
                "Colored {} countries ({} without value) into {}",
                summary.countries,
                summary.filled_with_zero,
                args.output.display()
            );
        }
    }

    Ok(())
}
