//! This module contains the network the solver works on: `NetworkDescription`, the raw
//! nodes/edges/OD pairs as they are read from a file, and `Network`, the same data
//! indexed for path enumeration and flow assignment.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::cost::CostFunction;

/// A node of the network. The position is only used for display.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// A directed edge with its cost function
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub cost_function: CostFunction,
}

/// An origin/destination pair and the flow that must travel between them
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OdPair {
    pub origin: String,
    pub destination: String,
    pub demand: f64,
}

impl OdPair {
    /// The key used for this pair in per-OD result maps
    pub fn key(&self) -> String {
        format!("{}->{}", self.origin, self.destination)
    }
}

/// A description of a congestion game, as supplied by the user
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct NetworkDescription {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub od_pairs: Vec<OdPair>,
}

/// A network, with its description and cached information.
///
/// Node and edge indices are positions in the description's lists.
/// Edges whose endpoints are not known nodes are left out of the adjacency.
#[derive(Debug, Clone)]
pub struct Network {
    pub description: NetworkDescription,
    /// Node id -> node index
    node_index: HashMap<String, usize>,
    /// For every node, the indices of its outgoing edges, in input order
    outgoing: Vec<Vec<usize>>,
    /// For every edge, its (source, target) node indices
    endpoints: Vec<Option<(usize, usize)>>,
    /// For every node, the number of edge endpoints on it
    degree: Vec<usize>,
}

impl Network {
    /// Create a new network from its description
    pub fn new(description: NetworkDescription) -> Self {
        let node_index: HashMap<String, usize> = description
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let mut outgoing = vec![vec![]; description.nodes.len()];
        let endpoints: Vec<Option<(usize, usize)>> = description
            .edges
            .iter()
            .enumerate()
            .map(|(e, edge)| {
                let s = *node_index.get(&edge.source)?;
                let t = *node_index.get(&edge.target)?;
                outgoing[s].push(e);
                Some((s, t))
            })
            .collect();
        for (edge, ends) in description.edges.iter().zip(&endpoints) {
            if ends.is_none() {
                warn!("Edge {} ({} -> {}) has an unknown endpoint and is ignored", edge.id, edge.source, edge.target);
            }
        }
        let mut degree = vec![0; description.nodes.len()];
        for &(s, t) in endpoints.iter().flatten() {
            degree[s] += 1;
            degree[t] += 1;
        }
        Self { description, node_index, outgoing, endpoints, degree }
    }

    pub fn n_nodes(&self) -> usize {
        self.description.nodes.len()
    }

    pub fn n_edges(&self) -> usize {
        self.description.edges.len()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Outgoing edge indices of a node
    pub fn outgoing(&self, node: usize) -> &[usize] {
        &self.outgoing[node]
    }

    /// `(source, target)` node indices of an edge, if both endpoints exist
    pub fn endpoints(&self, edge: usize) -> Option<(usize, usize)> {
        self.endpoints[edge]
    }

    pub fn edge(&self, edge: usize) -> &Edge {
        &self.description.edges[edge]
    }

    pub fn cost_function(&self, edge: usize) -> &CostFunction {
        &self.description.edges[edge].cost_function
    }

    pub fn od_pairs(&self) -> &[OdPair] {
        &self.description.od_pairs
    }

    /// Number of edges touching a node, counting both directions
    pub fn degree(&self, node: usize) -> usize {
        self.degree[node]
    }
}
