//! Congestion games on directed networks: Wardrop user equilibrium and system
//! optimum by Frank-Wolfe over bounded candidate path sets, with marginal-cost
//! tolls and the price of anarchy.
#![warn(rust_2018_idioms)]

use std::collections::BTreeMap;

use log::info;

pub mod assignment;
pub mod baseline;
pub mod config;
pub mod cost;
pub mod error;
pub mod generate;
pub mod line_search;
pub mod network;
pub mod parse;
pub mod paths;
pub mod report;
pub mod validate;


use crate::{
    assignment::Assignment,
    config::SolverConfig,
    error::Result,
    network::Network,
    report::{compute_tolls, format_results, price_of_anarchy, ComputationResult},
};

/// Solve a network for both the user equilibrium and the system optimum.
///
/// The two solves share the candidate paths but nothing mutable, and run in parallel.
pub fn compute(network: &Network, config: SolverConfig) -> Result<ComputationResult> {
    let assignment = Assignment::new(network, config);
    info!(
        "{} nodes, {} edges, {} OD pairs, {} candidate paths",
        network.n_nodes(),
        network.n_edges(),
        network.od_pairs().len(),
        assignment.n_paths()
    );

    let (equilibrium, optimum) =
        rayon::join(|| assignment.solve_equilibrium(), || assignment.solve_system_optimum());
    let (equilibrium, optimum) = (equilibrium?, optimum?);

    let tolls = compute_tolls(&assignment, &optimum.edge_flows);
    let wardrop_equilibrium = format_results(&assignment, &equilibrium, None);
    let system_optimum = format_results(&assignment, &optimum, Some(&tolls));
    let price_of_anarchy = price_of_anarchy(wardrop_equilibrium.total_system_cost, system_optimum.total_system_cost);
    info!("Price of anarchy: {price_of_anarchy:.4}");

    let optimal_tolls: BTreeMap<String, f64> = tolls
        .iter()
        .enumerate()
        .map(|(e, &toll)| (network.edge(e).id.clone(), toll))
        .collect();

    Ok(ComputationResult { wardrop_equilibrium, system_optimum, price_of_anarchy, optimal_tolls })
}
