use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hn_network::WaterNetwork;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

mod config;
mod error;
mod logging;

use config::CliConfig;
use error::{CliError, CliResult};
use hn_inp::{InvalidRecordPolicy, ParseOptions};

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "hydronet - convert water network descriptions to JSON", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one or more network files to JSON
    Convert {
        /// Network description files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory (defaults to each input's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Spaces per indentation level
        #[arg(long, conflicts_with = "compact")]
        indent: Option<usize>,
        /// Write single-line JSON
        #[arg(long)]
        compact: bool,
        /// YAML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Drop records that fail validation instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Parse and validate a network file
    Validate {
        input: PathBuf,
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Print element counts
    Stats {
        input: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    logging::setup_tracing(cli.verbose)?;

    match cli.command {
        Commands::Convert {
            inputs,
            out_dir,
            indent,
            compact,
            config,
            skip_invalid,
        } => {
            let mut settings = match &config {
                Some(path) => CliConfig::load(path)?,
                None => CliConfig::default(),
            };
            if let Some(n) = indent {
                settings.indent = n;
                settings.compact = false;
            }
            if compact {
                settings.compact = true;
            }
            if skip_invalid {
                settings.invalid_records = InvalidRecordPolicy::Skip;
            }
            cmd_convert(&inputs, out_dir.as_deref(), &settings)
        }
        Commands::Validate {
            input,
            skip_invalid,
        } => cmd_validate(&input, skip_invalid),
        Commands::Stats { input, json } => cmd_stats(&input, json),
    }
}

fn load(path: &Path, options: &ParseOptions) -> CliResult<WaterNetwork> {
    debug!(path = %path.display(), "parsing");
    let outcome =
        hn_inp::read_file_with(path, options).map_err(|e| CliError::network(path, e))?;
    for skipped in &outcome.skipped {
        warn!(path = %path.display(), "skipped record: {skipped}");
    }
    for pump in outcome.network.unusable_pumps() {
        warn!(path = %path.display(), pump = %pump.id, "pump has neither a HEAD curve nor a POWER rating");
    }
    Ok(outcome.network)
}

/// `<out_dir or input dir>/<input stem>.json`
fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".json");
    let dir = out_dir
        .or_else(|| input.parent())
        .unwrap_or_else(|| Path::new(""));
    dir.join(name)
}

fn convert_one(input: &Path, out_dir: Option<&Path>, settings: &CliConfig) -> CliResult<PathBuf> {
    let network = load(input, &settings.parse_options())?;
    let output = output_path(input, out_dir);
    hn_json::write_file(&output, &network, settings.indent())
        .map_err(|e| CliError::network(&output, e))?;
    let stats = network.statistics();
    info!(
        input = %input.display(),
        output = %output.display(),
        nodes = stats.total_nodes,
        links = stats.total_links,
        "converted"
    );
    Ok(output)
}

fn cmd_convert(inputs: &[PathBuf], out_dir: Option<&Path>, settings: &CliConfig) -> CliResult<()> {
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir).map_err(|e| CliError::network(dir, e.into()))?;
    }

    let results: Vec<CliResult<PathBuf>> = inputs
        .par_iter()
        .map(|input| convert_one(input, out_dir, settings))
        .collect();

    let mut failed = 0;
    for result in &results {
        match result {
            Ok(output) => println!("✓ {}", output.display()),
            Err(e) => {
                error!("{e}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(CliError::Batch {
            failed,
            total: inputs.len(),
        });
    }
    Ok(())
}

fn cmd_validate(input: &Path, skip_invalid: bool) -> CliResult<()> {
    println!("Validating network: {}", input.display());
    let options = if skip_invalid {
        ParseOptions::skip_invalid()
    } else {
        ParseOptions::default()
    };
    let network = load(input, &options)?;
    let stats = network.statistics();
    println!(
        "✓ Network is valid ({} nodes, {} links)",
        stats.total_nodes, stats.total_links
    );
    Ok(())
}

fn cmd_stats(input: &Path, json: bool) -> CliResult<()> {
    let network = load(input, &ParseOptions::default())?;
    let stats = network.statistics();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if !network.title().is_empty() {
        println!("{}", network.title().lines().next().unwrap_or_default());
    }
    println!("  Junctions:  {}", stats.total_junctions);
    println!("  Reservoirs: {}", stats.total_reservoirs);
    println!("  Tanks:      {}", stats.total_tanks);
    println!("  Pipes:      {}", stats.total_pipes);
    println!("  Pumps:      {}", stats.total_pumps);
    println!("  Valves:     {}", stats.total_valves);
    println!("  Nodes:      {}", stats.total_nodes);
    println!("  Links:      {}", stats.total_links);
    println!("  Patterns:   {}", network.patterns().len());
    println!("  Curves:     {}", network.curves().len());
    Ok(())
}
