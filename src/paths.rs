//! Enumerates candidate paths between an origin and a destination.
//!
//! A true Wardrop equilibrium ranges over every path of the network, and the
//! number of paths grows combinatorially. The enumeration is therefore bounded
//! by a maximum hop count and a maximum number of paths: the solver finds the
//! equilibrium over this candidate set only.

use itertools::Itertools;

use crate::network::Network;

/// A simple directed path: node indices from origin to destination and the
/// edge indices joining them
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidatePath {
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
}

impl CandidatePath {
    /// Node ids along the path
    pub fn node_ids(&self, network: &Network) -> Vec<String> {
        self.nodes.iter().map(|&n| network.description.nodes[n].id.clone()).collect_vec()
    }

    /// Edge ids along the path
    pub fn edge_ids(&self, network: &Network) -> Vec<String> {
        self.edges.iter().map(|&e| network.edge(e).id.clone()).collect_vec()
    }
}

/// Depth-first search state
struct Search<'a> {
    network: &'a Network,
    destination: usize,
    max_hops: usize,
    max_paths: usize,
    on_path: Vec<bool>,
    nodes: Vec<usize>,
    edges: Vec<usize>,
    found: Vec<CandidatePath>,
}

impl<'a> Search<'a> {
    fn visit(&mut self, node: usize) {
        let network = self.network;
        for &e in network.outgoing(node) {
            if self.found.len() >= self.max_paths {
                return;
            }
            let Some((_, next)) = network.endpoints(e) else { continue };
            if self.on_path[next] {
                continue;
            }
            self.nodes.push(next);
            self.edges.push(e);
            if next == self.destination {
                self.found.push(CandidatePath { nodes: self.nodes.clone(), edges: self.edges.clone() });
            } else if self.edges.len() < self.max_hops {
                self.on_path[next] = true;
                self.visit(next);
                self.on_path[next] = false;
            }
            self.nodes.pop();
            self.edges.pop();
        }
    }
}

/// Enumerate simple paths from `origin` to `destination` with at most `max_hops` edges,
/// keeping the first `max_paths` in depth-first order (outgoing edges are tried in input order).
///
/// Parallel edges yield distinct paths. Returns nothing if the destination is
/// unreachable or equal to the origin.
pub fn enumerate_paths(
    network: &Network,
    origin: usize,
    destination: usize,
    max_hops: usize,
    max_paths: usize,
) -> Vec<CandidatePath> {
    if origin == destination || max_hops == 0 || max_paths == 0 {
        return vec![];
    }
    let mut on_path = vec![false; network.n_nodes()];
    on_path[origin] = true;
    let mut search = Search {
        network,
        destination,
        max_hops,
        max_paths,
        on_path,
        nodes: vec![origin],
        edges: vec![],
        found: vec![],
    };
    search.visit(origin);
    search.found
}

/// Whether `destination` can be reached from `origin`, ignoring hop limits
pub fn is_reachable(network: &Network, origin: usize, destination: usize) -> bool {
    let mut seen = vec![false; network.n_nodes()];
    let mut stack = vec![origin];
    seen[origin] = true;
    while let Some(n) = stack.pop() {
        if n == destination {
            return true;
        }
        for &e in network.outgoing(n) {
            if let Some((_, next)) = network.endpoints(e) {
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
    }
    false
}
