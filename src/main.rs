#![warn(rust_2018_idioms)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{debug, error};

use congestion_game::{
    compute,
    config::SolverConfig,
    error::Result,
    generate::random_network,
    network::Network,
    parse::{parse_config, parse_network, save_network},
    validate::{check_input, connectivity_report},
};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

/// Decimals kept in the JSON output
const OUTPUT_DIGITS: i32 = 4;

#[derive(Parser, Debug)]
#[command(name = "congestion-game", version, about = "Wardrop equilibrium and system optimum on traffic networks")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a network for equilibrium, system optimum, tolls and price of anarchy
    Compute {
        /// Network file (.toml or .json)
        network: PathBuf,
        /// Solver configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        max_iterations: Option<usize>,
        #[arg(long)]
        tolerance: Option<f64>,
        #[arg(long)]
        max_hops: Option<usize>,
        #[arg(long)]
        max_paths: Option<usize>,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check OD connectivity and isolated nodes without solving
    Validate {
        /// Network file (.toml or .json)
        network: PathBuf,
    },
    /// Write a random network
    Generate {
        nodes: usize,
        edges: usize,
        od_pairs: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Output file (.toml or .json)
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn emit(json: String, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Compute { network, config, max_iterations, tolerance, max_hops, max_paths, output } => {
            let mut solver_config = match config {
                Some(path) => parse_config(path)?,
                None => SolverConfig::default(),
            };
            solver_config.max_iterations = max_iterations.unwrap_or(solver_config.max_iterations);
            solver_config.tolerance = tolerance.unwrap_or(solver_config.tolerance);
            solver_config.max_hops = max_hops.unwrap_or(solver_config.max_hops);
            solver_config.max_paths = max_paths.unwrap_or(solver_config.max_paths);
            debug!("{solver_config:?}");

            let description = parse_network(&network)?;
            check_input(&description)?;
            let result = compute(&Network::new(description), solver_config)?.rounded(OUTPUT_DIGITS);
            emit(serde_json::to_string_pretty(&result)?, output)
        }
        Command::Validate { network } => {
            let network = Network::new(parse_network(&network)?);
            emit(serde_json::to_string_pretty(&connectivity_report(&network))?, None)
        }
        Command::Generate { nodes, edges, od_pairs, seed, output } => {
            save_network(output, &random_network(nodes, edges, od_pairs, seed))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(why) = run(cli.command) {
        error!("{why}");
        std::process::exit(1);
    }
}
