//! Toolpath CLI - inspect and reorder layer toolpath trees
//!
//! Usage:
//!   toolpath-cli chain <layers.json> [-c config.json] [-o chained.json]
//!   toolpath-cli stats <layers.json> [-c config.json]
//!
//! Input files hold a JSON array with one extrusion entity collection per
//! layer.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use toolpath::clipper;
use toolpath::{CoverageMode, ExtrusionEntityCollection, ToolpathConfig, SCALING_FACTOR};

/// Order and measure extrusion toolpath trees
#[derive(Parser, Debug)]
#[command(name = "toolpath-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reorder every layer to minimize travel
    Chain {
        /// Input layers file (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Configuration file (JSON)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Write the chained layers to this file (JSON)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Print per-layer leaf count, role, volume and covered area
    Stats {
        /// Input layers file (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Configuration file (JSON)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Chain {
            input,
            config,
            output,
        } => cmd_chain(&input, config.as_deref(), output.as_deref()),
        Commands::Stats { input, config } => cmd_stats(&input, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<ToolpathConfig> {
    match path {
        Some(path) => ToolpathConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(ToolpathConfig::default()),
    }
}

fn load_layers(path: &Path) -> Result<Vec<ExtrusionEntityCollection>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let layers: Vec<ExtrusionEntityCollection> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse layers from {}", path.display()))?;
    info!("Loaded {} layers from {}", layers.len(), path.display());
    Ok(layers)
}

fn cmd_chain(input: &Path, config: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let layers = load_layers(input)?;
    let chaining = &config.chaining;
    let start = chaining.start_point();

    let progress = ProgressBar::new(layers.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let mut chained_layers = Vec::with_capacity(layers.len());
    let mut report = Vec::with_capacity(layers.len());
    for (index, layer) in layers.iter().enumerate() {
        progress.set_message(format!("layer {}", index));
        let chained = match start {
            Some(point) => layer.chained_path_from(point, chaining.no_reverse, chaining.role),
            None => layer.chained_path(chaining.no_reverse, chaining.role),
        }
        .with_context(|| format!("Failed to chain layer {}", index))?;

        let before = layer.travel_length(start) / SCALING_FACTOR;
        let after = chained.travel_length(start) / SCALING_FACTOR;
        report.push((index, chained.len(), before, after));
        chained_layers.push(chained);
        progress.inc(1);
    }
    progress.finish_with_message("done");

    println!("{:>6} {:>8} {:>14} {:>14}", "layer", "entities", "travel before", "travel after");
    let (mut total_before, mut total_after) = (0.0, 0.0);
    for (index, count, before, after) in &report {
        println!("{:>6} {:>8} {:>12.3}mm {:>12.3}mm", index, count, before, after);
        total_before += before;
        total_after += after;
    }
    println!("Total travel: {:.3}mm -> {:.3}mm", total_before, total_after);

    if let Some(output) = output {
        let file = fs::File::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &chained_layers)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Wrote {} chained layers to {}", chained_layers.len(), output.display());
    }

    Ok(())
}

fn cmd_stats(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let layers = load_layers(input)?;
    let epsilon = config.coverage.scaled_epsilon();

    println!(
        "{:>6} {:>8} {:>20} {:>14} {:>16}",
        "layer", "leaves", "role", "volume (mm3)", "covered (mm2)"
    );
    for (index, layer) in layers.iter().enumerate() {
        let layer = layer.flatten(config.flatten_preserve_ordering);
        let coverage = match config.coverage.mode {
            CoverageMode::Width => layer.polygons_covered_by_width(epsilon),
            CoverageMode::Spacing => layer
                .polygons_covered_by_spacing(epsilon)
                .with_context(|| format!("Failed to compute coverage of layer {}", index))?,
        };
        let area = clipper::total_area(&clipper::union(&coverage)) / (SCALING_FACTOR * SCALING_FACTOR);

        println!(
            "{:>6} {:>8} {:>20} {:>14.4} {:>16.4}",
            index,
            layer.items_count(),
            layer.role().name(),
            layer.total_volume(),
            area
        );
    }

    Ok(())
}
