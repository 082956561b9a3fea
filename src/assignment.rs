//! Frank-Wolfe traffic assignment over a bounded set of candidate paths.
//!
//! The state being optimised is a vector of path flows, one entry per candidate
//! path across all OD pairs. Edge flows are never stored independently: they are
//! always recomputed by summing each path's flow over the edges it uses.
//!
//! Both solve modes run the same loop. They differ in which edge cost steers the
//! all-or-nothing direction (actual or marginal) and which objective the line
//! search minimises (Beckmann potential or total system cost).

use std::ops::Range;

use log::{debug, info, trace, warn};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::{
    baseline::all_or_nothing,
    config::SolverConfig,
    error::{Error, Result},
    line_search::{minimize_bounded, MAX_EVALUATIONS},
    network::Network,
    paths::{enumerate_paths, CandidatePath},
};

/// Which solution concept to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveMode {
    /// Wardrop user equilibrium: minimises the Beckmann potential
    Equilibrium,
    /// System optimum: minimises total travel cost
    SystemOptimum,
}

impl SolveMode {
    /// Whether path costs are built from marginal edge costs
    pub fn uses_marginal_cost(self) -> bool {
        self == SolveMode::SystemOptimum
    }
}

/// The candidate paths of one OD pair, as a contiguous range of path indices
#[derive(Debug, Clone, PartialEq)]
pub struct OdPaths {
    /// Index of the OD pair in the network description
    pub od: usize,
    pub demand: f64,
    pub paths: Range<usize>,
}

/// How a solve ended
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct SolveStats {
    /// False if the iteration budget ran out before the flows settled
    pub converged: bool,
    /// Frank-Wolfe iterations actually performed
    pub iterations: usize,
    /// Largest change of a single path flow in the last iteration
    pub max_flow_change: f64,
    /// `(c·x - c·y) / c·x` at the final flows, where `y` is the all-or-nothing
    /// assignment for the costs `c`. Zero at an exact optimum.
    pub relative_gap: f64,
}

/// Path and edge flows found by a solve
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub path_flows: Array1<f64>,
    pub edge_flows: Array1<f64>,
    pub stats: SolveStats,
}

/// A flow assignment problem: one network and its candidate paths, grouped by
/// OD pair. Build one per network; solves don't mutate it.
#[derive(Debug, Clone)]
pub struct Assignment<'a> {
    pub network: &'a Network,
    pub config: SolverConfig,
    paths: Vec<CandidatePath>,
    groups: Vec<OdPaths>,
}

impl<'a> Assignment<'a> {
    /// Enumerate candidate paths for every OD pair
    pub fn new(network: &'a Network, config: SolverConfig) -> Self {
        let mut paths = vec![];
        let mut groups = vec![];
        for (od, pair) in network.od_pairs().iter().enumerate() {
            let (Some(origin), Some(destination)) =
                (network.node_index(&pair.origin), network.node_index(&pair.destination))
            else {
                warn!("OD pair {} refers to an unknown node, skipping", pair.key());
                continue;
            };
            let found = enumerate_paths(network, origin, destination, config.max_hops, config.max_paths);
            if found.is_empty() {
                warn!("No candidate path for OD pair {}", pair.key());
                continue;
            }
            debug!("OD pair {}: {} candidate paths", pair.key(), found.len());
            let start = paths.len();
            paths.extend(found);
            groups.push(OdPaths { od, demand: pair.demand, paths: start..paths.len() });
        }
        Self { network, config, paths, groups }
    }

    /// All candidate paths, in path-flow vector order
    pub fn paths(&self) -> &[CandidatePath] {
        &self.paths
    }

    /// Candidate path ranges of the OD pairs that have at least one path
    pub fn groups(&self) -> &[OdPaths] {
        &self.groups
    }

    pub fn n_paths(&self) -> usize {
        self.paths.len()
    }

    /// Sum the flow of every path over the edges it uses
    pub fn edge_flows(&self, path_flows: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut edge_flows = Array1::zeros(self.network.n_edges());
        for (path, &flow) in self.paths.iter().zip(path_flows.iter()) {
            for &e in &path.edges {
                edge_flows[e] += flow;
            }
        }
        edge_flows
    }

    /// Per-edge cost at the given edge flows, actual or marginal
    pub fn edge_costs(&self, edge_flows: ArrayView1<'_, f64>, marginal: bool) -> Array1<f64> {
        Array1::from_iter(
            edge_flows
                .iter()
                .enumerate()
                .map(|(e, &f)| self.network.cost_function(e).steering_cost(f, marginal)),
        )
    }

    /// Cost of every candidate path at the given edge flows
    pub fn path_costs(&self, edge_flows: ArrayView1<'_, f64>, marginal: bool) -> Array1<f64> {
        let edge_costs = self.edge_costs(edge_flows, marginal);
        Array1::from_iter(self.paths.iter().map(|path| path.edges.iter().map(|&e| edge_costs[e]).sum::<f64>()))
    }

    /// The scalar each mode minimises: the Beckmann potential `Σ ∫ t_e` for
    /// equilibrium, total cost `Σ f_e t_e(f_e)` for the system optimum
    pub fn objective(&self, mode: SolveMode, edge_flows: ArrayView1<'_, f64>) -> f64 {
        edge_flows
            .iter()
            .enumerate()
            .map(|(e, &f)| {
                let c = self.network.cost_function(e);
                match mode {
                    SolveMode::Equilibrium => c.integral(f),
                    SolveMode::SystemOptimum => f * c.cost(f),
                }
            })
            .sum()
    }

    /// The all-or-nothing assignment against zero-flow costs
    pub fn initial_flows(&self, mode: SolveMode) -> Array1<f64> {
        let zero = Array1::zeros(self.network.n_edges());
        let costs = self.path_costs(zero.view(), mode.uses_marginal_cost());
        all_or_nothing(&self.groups, costs.view())
    }

    /// Step size in `[0, 1]` minimising the objective along `edge_flows + α·edge_direction`
    fn line_search(&self, mode: SolveMode, edge_flows: &Array1<f64>, edge_direction: &Array1<f64>) -> f64 {
        let objective = |alpha: f64| {
            let moved = edge_flows + &(edge_direction * alpha);
            self.objective(mode, moved.view())
        };
        let alpha = minimize_bounded(&objective, 0.0, 1.0, self.config.line_search_tolerance, MAX_EVALUATIONS);
        // The minimiser stops just short of the bounds; take them if they are no worse
        let best = objective(alpha);
        if objective(0.0) <= best {
            0.0
        } else if objective(1.0) < best {
            1.0
        } else {
            alpha
        }
    }

    /// Relative gap between the current flows and the best all-or-nothing response to their costs
    pub fn relative_gap(&self, mode: SolveMode, path_flows: ArrayView1<'_, f64>) -> f64 {
        let edge_flows = self.edge_flows(path_flows);
        let costs = self.path_costs(edge_flows.view(), mode.uses_marginal_cost());
        let best = all_or_nothing(&self.groups, costs.view());
        let current = costs.dot(&path_flows);
        if current > 0.0 {
            (current - costs.dot(&best)) / current
        } else {
            0.0
        }
    }

    /// Solve for the Wardrop user equilibrium
    pub fn solve_equilibrium(&self) -> Result<Solution> {
        self.solve(SolveMode::Equilibrium)
    }

    /// Solve for the system optimum
    pub fn solve_system_optimum(&self) -> Result<Solution> {
        self.solve(SolveMode::SystemOptimum)
    }

    /// Solve starting from the all-or-nothing assignment at zero flow
    pub fn solve(&self, mode: SolveMode) -> Result<Solution> {
        self.solve_from(mode, self.initial_flows(mode))
    }

    /// Run Frank-Wolfe from the given path flows.
    ///
    /// The flows must be feasible (each OD pair's paths summing to its demand)
    /// for the result to be meaningful. Exhausting the iteration budget is not
    /// an error: the last flows are returned with `converged == false`.
    pub fn solve_from(&self, mode: SolveMode, initial: Array1<f64>) -> Result<Solution> {
        if initial.len() != self.n_paths() {
            return Err(Error::ShapeMismatch { expected: self.n_paths(), found: initial.len() });
        }
        let mut path_flows = initial;
        let mut stats = SolveStats { converged: false, iterations: 0, max_flow_change: 0.0, relative_gap: 0.0 };

        if self.paths.is_empty() {
            stats.converged = true;
        }
        while !stats.converged && stats.iterations < self.config.max_iterations {
            let edge_flows = self.edge_flows(path_flows.view());
            let costs = self.path_costs(edge_flows.view(), mode.uses_marginal_cost());
            let direction = all_or_nothing(&self.groups, costs.view());

            let delta = &direction - &path_flows;
            let alpha = self.line_search(mode, &edge_flows, &self.edge_flows(delta.view()));
            let step = delta * alpha;
            path_flows += &step;

            stats.iterations += 1;
            stats.max_flow_change = max_abs_change(step.view());
            trace!(
                "{:?} iteration {}: step {:.6}, max flow change {:.3e}",
                mode, stats.iterations, alpha, stats.max_flow_change
            );
            // a NaN change never compares below the tolerance, so it runs out the budget
            stats.converged = stats.max_flow_change < self.config.tolerance;
        }

        let edge_flows = self.edge_flows(path_flows.view());
        stats.relative_gap = self.relative_gap(mode, path_flows.view());
        if stats.converged {
            info!("{:?} converged after {} iterations (relative gap {:.3e})", mode, stats.iterations, stats.relative_gap);
        } else {
            warn!(
                "{:?} did not converge within {} iterations (max flow change {:.3e}, relative gap {:.3e})",
                mode, self.config.max_iterations, stats.max_flow_change, stats.relative_gap
            );
        }
        self.check_finite(mode, &path_flows, &edge_flows)?;
        Ok(Solution { path_flows, edge_flows, stats })
    }

    fn check_finite(&self, mode: SolveMode, path_flows: &Array1<f64>, edge_flows: &Array1<f64>) -> Result<()> {
        if let Some(p) = path_flows.iter().position(|f| !f.is_finite()) {
            let path = self.paths[p].node_ids(self.network).join("->");
            return Err(Error::NonFinite { what: format!("flow on path {path}") });
        }
        let costs = self.edge_costs(edge_flows.view(), mode.uses_marginal_cost());
        let bad_edge = edge_flows.iter().zip(costs.iter()).position(|(f, c)| !f.is_finite() || !c.is_finite());
        if let Some(e) = bad_edge {
            return Err(Error::NonFinite { what: format!("cost on edge {}", self.network.edge(e).id) });
        }
        Ok(())
    }
}

/// Largest absolute entry; NaN if any entry is NaN
fn max_abs_change(step: ArrayView1<'_, f64>) -> f64 {
    step.iter().map(|d| d.abs()).fold(0.0, |m, d| if d > m || d.is_nan() { d } else { m })
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{cost::CostFunction, network::{Edge, NetworkDescription, Node, OdPair}};

    /// Two routes from A to C: a direct edge, and a detour through B
    fn two_route_network(direct: CostFunction) -> Network {
        let node = |id: &str| Node { id: id.to_string(), x: 0.0, y: 0.0 };
        let edge = |id: &str, s: &str, t: &str, c| Edge { id: id.to_string(), source: s.to_string(), target: t.to_string(), cost_function: c };
        Network::new(NetworkDescription {
            nodes: vec![node("A"), node("B"), node("C")],
            edges: vec![
                edge("AB", "A", "B", CostFunction::linear(1.0, 0.0)),
                edge("BC", "B", "C", CostFunction::linear(0.0, 1.0)),
                edge("AC", "A", "C", direct),
            ],
            od_pairs: vec![OdPair { origin: "A".to_string(), destination: "C".to_string(), demand: 4.0 }],
        })
    }

    #[test]
    fn test_edge_flows_and_path_costs() {
        let network = two_route_network(CostFunction::linear(0.0, 3.0));
        let assignment = Assignment::new(&network, SolverConfig::default());
        assert_eq!(assignment.n_paths(), 2);
        assert_eq!(assignment.groups()[0].paths, 0..2);

        let edge_flows = assignment.edge_flows(array![1.5, 2.5].view());
        assert_eq!(edge_flows, array![1.5, 1.5, 2.5]);
        let costs = assignment.path_costs(edge_flows.view(), false);
        assert_eq!(costs, array![2.5, 3.0]);
        let marginal = assignment.path_costs(edge_flows.view(), true);
        assert_eq!(marginal, array![4.0, 3.0]);
    }

    #[test]
    fn test_initial_flows_use_zero_flow_costs() {
        let network = two_route_network(CostFunction::linear(0.0, 3.0));
        let assignment = Assignment::new(&network, SolverConfig::default());
        // detour costs 1 at zero flow, direct costs 3
        assert_eq!(assignment.initial_flows(SolveMode::Equilibrium), array![4.0, 0.0]);
    }

    #[test]
    fn test_equilibrium_equalises_used_paths() {
        let network = two_route_network(CostFunction::linear(0.0, 3.0));
        let solution = Assignment::new(&network, SolverConfig::default()).solve_equilibrium().unwrap();
        // detour cost f + 1 equals the direct 3 at f = 2
        assert!((solution.path_flows[0] - 2.0).abs() < 1e-3, "{:?}", solution.path_flows);
        assert!((solution.path_flows[1] - 2.0).abs() < 1e-3, "{:?}", solution.path_flows);
        assert!(solution.stats.relative_gap < 1e-3);
    }

    #[test]
    fn test_system_optimum_equalises_marginal_costs() {
        let network = two_route_network(CostFunction::linear(0.0, 3.0));
        let solution = Assignment::new(&network, SolverConfig::default()).solve_system_optimum().unwrap();
        // marginal detour cost 2f + 1 equals 3 at f = 1
        assert!((solution.path_flows[0] - 1.0).abs() < 1e-3, "{:?}", solution.path_flows);
        assert!((solution.path_flows[1] - 3.0).abs() < 1e-3, "{:?}", solution.path_flows);
    }

    #[test]
    fn test_budget_exhaustion_is_reported() {
        let network = two_route_network(CostFunction::linear(0.0, 3.0));
        let config = SolverConfig { max_iterations: 1, ..SolverConfig::default() };
        let solution = Assignment::new(&network, config).solve_equilibrium().unwrap();
        assert!(!solution.stats.converged);
        assert_eq!(solution.stats.iterations, 1);
        assert!((solution.path_flows.sum() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_warm_start_shape_checked() {
        let network = two_route_network(CostFunction::linear(0.0, 3.0));
        let assignment = Assignment::new(&network, SolverConfig::default());
        let res = assignment.solve_from(SolveMode::Equilibrium, array![4.0]);
        assert!(matches!(res, Err(Error::ShapeMismatch { expected: 2, found: 1 })));
    }

    #[test]
    fn test_max_abs_change_keeps_nan() {
        assert_eq!(max_abs_change(array![0.5, -2.0, 1.0].view()), 2.0);
        assert!(max_abs_change(array![0.5, f64::NAN, 1.0].view()).is_nan());
        assert!(max_abs_change(array![f64::NAN, 3.0].view()).is_nan());
        assert_eq!(max_abs_change(Array1::<f64>::zeros(0).view()), 0.0);
    }

    #[test]
    fn test_shared_edges_accumulate_flow() {
        // a second OD pair A->B puts its flow on AB alongside the detour
        let mut network = two_route_network(CostFunction::linear(0.0, 3.0)).description;
        network.od_pairs.push(OdPair { origin: "A".to_string(), destination: "B".to_string(), demand: 1.0 });
        let network = Network::new(network);
        let assignment = Assignment::new(&network, SolverConfig::default());
        assert_eq!(assignment.n_paths(), 3);
        assert_eq!(assignment.groups()[1].paths, 2..3);
        let edge_flows = assignment.edge_flows(array![1.0, 3.0, 1.0].view());
        assert_eq!(edge_flows, array![2.0, 1.0, 3.0]);
        assert_eq!(assignment.path_costs(edge_flows.view(), false), array![3.0, 3.0, 2.0]);
    }

    #[test]
    fn test_large_network_stays_feasible() {
        let network = Network::new(crate::generate::random_network(150, 1500, 150, 3));
        let config = SolverConfig { max_iterations: 20, ..SolverConfig::default() };
        let assignment = Assignment::new(&network, config);
        let solution = assignment.solve_equilibrium().unwrap();
        for group in assignment.groups() {
            let routed = solution.path_flows.slice(ndarray::s![group.paths.clone()]).sum();
            assert!((routed - group.demand).abs() <= 1e-6 * group.demand.max(1.0));
        }
        assert_eq!(solution.edge_flows, assignment.edge_flows(solution.path_flows.view()));
    }

    #[test]
    fn test_non_finite_costs_fail() {
        let network = two_route_network(CostFunction::Polynomial { a: f64::NAN, k: 1.0, b: 0.0 });
        let config = SolverConfig { max_iterations: 5, ..SolverConfig::default() };
        let res = Assignment::new(&network, config).solve_equilibrium();
        assert!(matches!(res, Err(Error::NonFinite { .. })), "{res:?}");
    }
}
