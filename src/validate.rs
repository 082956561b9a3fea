//! Checks on a network before it is solved.
//!
//! `check_input` rejects descriptions the solver cannot work with at all.
//! `connectivity_report` only looks at reachability and never runs the solver.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    network::{Network, NetworkDescription},
    paths::is_reachable,
};

/// Reject empty lists, dangling references, duplicate ids and bad demands
pub fn check_input(description: &NetworkDescription) -> Result<()> {
    if description.nodes.is_empty() {
        return Err(Error::EmptyNetwork("nodes"));
    }
    if description.edges.is_empty() {
        return Err(Error::EmptyNetwork("edges"));
    }
    if description.od_pairs.is_empty() {
        return Err(Error::EmptyNetwork("OD pairs"));
    }

    let mut node_ids = HashSet::new();
    for node in &description.nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(Error::DuplicateId { kind: "node", id: node.id.clone() });
        }
    }
    let mut edge_ids = HashSet::new();
    for edge in &description.edges {
        if !edge_ids.insert(edge.id.as_str()) {
            return Err(Error::DuplicateId { kind: "edge", id: edge.id.clone() });
        }
        for (role, id) in [("Source", &edge.source), ("Target", &edge.target)] {
            if !node_ids.contains(id.as_str()) {
                return Err(Error::UnknownNode { role, id: id.clone() });
            }
        }
    }
    for od in &description.od_pairs {
        for (role, id) in [("Origin", &od.origin), ("Destination", &od.destination)] {
            if !node_ids.contains(id.as_str()) {
                return Err(Error::UnknownNode { role, id: id.clone() });
            }
        }
        if !od.demand.is_finite() || od.demand < 0.0 {
            return Err(Error::InvalidDemand { od: od.key(), demand: od.demand });
        }
    }
    Ok(())
}

/// Result of a connectivity check
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub od_pair_count: usize,
}

/// List OD pairs with no connecting path and nodes without any edge
pub fn connectivity_report(network: &Network) -> ValidationReport {
    let mut issues = vec![];
    for od in network.od_pairs() {
        match (network.node_index(&od.origin), network.node_index(&od.destination)) {
            (Some(o), Some(d)) => {
                if !is_reachable(network, o, d) {
                    issues.push(format!("No path from {} to {}", od.origin, od.destination));
                }
            }
            (None, _) => issues.push(format!("Origin node {} not found", od.origin)),
            (_, None) => issues.push(format!("Destination node {} not found", od.destination)),
        }
    }
    for (i, node) in network.description.nodes.iter().enumerate() {
        if network.degree(i) == 0 {
            issues.push(format!("Node {} is isolated", node.id));
        }
    }
    ValidationReport {
        valid: issues.is_empty(),
        issues,
        node_count: network.n_nodes(),
        edge_count: network.n_edges(),
        od_pair_count: network.od_pairs().len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cost::CostFunction,
        network::{Edge, Node, OdPair},
    };

    fn description() -> NetworkDescription {
        let node = |id: &str| Node { id: id.to_string(), x: 0.0, y: 0.0 };
        NetworkDescription {
            nodes: vec![node("A"), node("B"), node("C"), node("D")],
            edges: vec![Edge {
                id: "ab".to_string(),
                source: "A".to_string(),
                target: "B".to_string(),
                cost_function: CostFunction::default(),
            }],
            od_pairs: vec![
                OdPair { origin: "A".to_string(), destination: "B".to_string(), demand: 1.0 },
                OdPair { origin: "B".to_string(), destination: "A".to_string(), demand: 1.0 },
            ],
        }
    }

    #[test]
    fn test_check_input_accepts_valid() {
        assert!(check_input(&description()).is_ok());
    }

    #[test]
    fn test_check_input_rejects_defects() {
        let mut d = description();
        d.od_pairs[0].destination = "Z".to_string();
        assert!(matches!(check_input(&d), Err(Error::UnknownNode { role: "Destination", .. })));

        let mut d = description();
        d.od_pairs[1].demand = -2.0;
        assert!(matches!(check_input(&d), Err(Error::InvalidDemand { .. })));

        let mut d = description();
        d.nodes.push(Node { id: "A".to_string(), x: 1.0, y: 1.0 });
        assert!(matches!(check_input(&d), Err(Error::DuplicateId { kind: "node", .. })));

        let mut d = description();
        d.edges.clear();
        assert!(matches!(check_input(&d), Err(Error::EmptyNetwork("edges"))));
    }

    #[test]
    fn test_connectivity_report() {
        let report = connectivity_report(&Network::new(description()));
        assert!(!report.valid);
        assert_eq!(
            report.issues,
            vec!["No path from B to A", "Node C is isolated", "Node D is isolated"]
        );
        assert_eq!((report.node_count, report.edge_count, report.od_pair_count), (4, 1, 2));
    }
}
