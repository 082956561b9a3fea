//! Turns solved flows into reportable results: per-edge costs and congestion,
//! used paths, total and per-OD costs, marginal-cost tolls and the price of anarchy.

use std::collections::BTreeMap;

use itertools::Itertools;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::assignment::{Assignment, Solution, SolveStats};

/// Paths carrying no more than this are left out of the report
pub const PATH_FLOW_THRESHOLD: f64 = 1e-6;

/// Flow and cost on a single edge
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EdgeResult {
    pub id: String,
    pub flow: f64,
    pub cost: f64,
    pub toll: f64,
    /// Flow relative to the busiest edge, in `[0, 1]`
    pub congestion_level: f64,
}

/// A used path and its flow
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PathFlow {
    /// Node ids
    pub path: Vec<String>,
    /// Edge ids
    pub edges: Vec<String>,
    pub flow: f64,
}

/// Everything reported about one solve
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EquilibriumResult {
    pub edge_results: Vec<EdgeResult>,
    pub path_flows: Vec<PathFlow>,
    pub total_system_cost: f64,
    /// Average travel cost per OD pair, keyed `origin->destination`.
    /// OD pairs without candidate paths are absent.
    pub od_costs: BTreeMap<String, f64>,
    pub stats: SolveStats,
}

/// Both solution concepts for one network, side by side
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ComputationResult {
    pub wardrop_equilibrium: EquilibriumResult,
    pub system_optimum: EquilibriumResult,
    pub price_of_anarchy: f64,
    /// Edge id -> toll that makes the equilibrium coincide with the system optimum
    pub optimal_tolls: BTreeMap<String, f64>,
}

/// Marginal-cost tolls `f_e * t_e'(f_e)`, meant for system-optimum edge flows
pub fn compute_tolls(assignment: &Assignment<'_>, edge_flows: &Array1<f64>) -> Array1<f64> {
    Array1::from_iter(
        edge_flows
            .iter()
            .enumerate()
            .map(|(e, &f)| f * assignment.network.cost_function(e).derivative(f)),
    )
}

/// Ratio of equilibrium to system-optimum total cost; 1 when the optimum costs nothing
pub fn price_of_anarchy(equilibrium_cost: f64, optimum_cost: f64) -> f64 {
    if optimum_cost > 0.0 {
        equilibrium_cost / optimum_cost
    } else {
        1.0
    }
}

/// Build the report for a solved assignment
pub fn format_results(
    assignment: &Assignment<'_>,
    solution: &Solution,
    tolls: Option<&Array1<f64>>,
) -> EquilibriumResult {
    let network = assignment.network;
    let edge_flows = &solution.edge_flows;
    let edge_costs = assignment.edge_costs(edge_flows.view(), false);

    let max_flow = edge_flows.iter().copied().fold(0.0, f64::max);
    let edge_results = (0..network.n_edges())
        .map(|e| {
            let flow = edge_flows[e];
            let congestion_level = if max_flow > 0.0 { (flow / max_flow).clamp(0.0, 1.0) } else { 0.0 };
            EdgeResult {
                id: network.edge(e).id.clone(),
                flow,
                cost: edge_costs[e],
                toll: tolls.map_or(0.0, |t| t[e]),
                congestion_level,
            }
        })
        .collect_vec();

    let path_flows = assignment
        .paths()
        .iter()
        .zip(solution.path_flows.iter())
        .filter(|(_, flow)| **flow > PATH_FLOW_THRESHOLD)
        .map(|(path, &flow)| PathFlow { path: path.node_ids(network), edges: path.edge_ids(network), flow })
        .collect_vec();

    let total_system_cost = edge_flows.dot(&edge_costs);

    let path_costs = assignment.path_costs(edge_flows.view(), false);
    let mut od_costs = BTreeMap::new();
    for group in assignment.groups() {
        let flows = solution.path_flows.slice(ndarray::s![group.paths.clone()]);
        let costs = path_costs.slice(ndarray::s![group.paths.clone()]);
        let total_flow = flows.sum();
        let cost = if total_flow > 0.0 {
            flows.dot(&costs) / total_flow
        } else {
            costs.iter().copied().fold(f64::INFINITY, f64::min)
        };
        od_costs.insert(network.od_pairs()[group.od].key(), cost);
    }

    EquilibriumResult { edge_results, path_flows, total_system_cost, od_costs, stats: solution.stats }
}

fn round_to(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}

impl EquilibriumResult {
    /// Round every reported quantity to `digits` decimals
    pub fn rounded(mut self, digits: i32) -> Self {
        for e in &mut self.edge_results {
            e.flow = round_to(e.flow, digits);
            e.cost = round_to(e.cost, digits);
            e.toll = round_to(e.toll, digits);
            e.congestion_level = round_to(e.congestion_level, digits);
        }
        for p in &mut self.path_flows {
            p.flow = round_to(p.flow, digits);
        }
        self.total_system_cost = round_to(self.total_system_cost, digits);
        for c in self.od_costs.values_mut() {
            *c = round_to(*c, digits);
        }
        self
    }
}

impl ComputationResult {
    /// Round every reported quantity to `digits` decimals
    pub fn rounded(self, digits: i32) -> Self {
        Self {
            wardrop_equilibrium: self.wardrop_equilibrium.rounded(digits),
            system_optimum: self.system_optimum.rounded(digits),
            price_of_anarchy: round_to(self.price_of_anarchy, digits),
            optimal_tolls: self.optimal_tolls.into_iter().map(|(id, t)| (id, round_to(t, digits))).collect(),
        }
    }
}
