//! Random networks, for experiments and for property tests.

use crate::{
    cost::CostFunction,
    network::{Edge, NetworkDescription, Node, OdPair},
};

fn uniform(rng: &mut fastrand::Rng, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.f64()
}

/// A random cost function: linear or quadratic polynomial, or a BPR curve
pub fn random_cost_function(rng: &mut fastrand::Rng) -> CostFunction {
    if rng.bool() {
        CostFunction::Polynomial {
            a: uniform(rng, 0.1, 2.0),
            k: if rng.bool() { 1.0 } else { 2.0 },
            b: uniform(rng, 0.0, 5.0),
        }
    } else {
        CostFunction::bpr(uniform(rng, 1.0, 5.0), uniform(rng, 5.0, 20.0))
    }
}

/// Generate a random network with `n` nodes (at least 2).
///
/// The nodes are first joined in a directed ring so every OD pair is
/// reachable; the remaining `n_edges - n` edges are placed at random, parallel
/// edges included. OD pairs have distinct endpoints and demand in `[1, 10)`.
pub fn random_network(n: usize, n_edges: usize, n_od_pairs: usize, seed: u64) -> NetworkDescription {
    let n = n.max(2);
    let mut rng = fastrand::Rng::with_seed(seed);
    let id = |i: usize| format!("n{i}");

    let nodes = (0..n)
        .map(|i| Node { id: id(i), x: uniform(&mut rng, 0.0, 100.0), y: uniform(&mut rng, 0.0, 100.0) })
        .collect();

    let mut pairs = (0..n).map(|i| (i, (i + 1) % n)).collect::<Vec<_>>();
    while pairs.len() < n_edges {
        let s = rng.usize(0..n);
        let t = rng.usize(0..n);
        if s != t {
            pairs.push((s, t));
        }
    }
    let edges = pairs
        .into_iter()
        .enumerate()
        .map(|(e, (s, t))| Edge {
            id: format!("e{e}"),
            source: id(s),
            target: id(t),
            cost_function: random_cost_function(&mut rng),
        })
        .collect();

    let od_pairs = (0..n_od_pairs)
        .map(|_| {
            let origin = rng.usize(0..n);
            let destination = (origin + rng.usize(1..n)) % n;
            OdPair { origin: id(origin), destination: id(destination), demand: uniform(&mut rng, 1.0, 10.0) }
        })
        .collect();

    NetworkDescription { nodes, edges, od_pairs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::check_input;

    #[test]
    fn test_random_network_is_valid_and_seeded() {
        let network = random_network(6, 12, 4, 7);
        assert!(check_input(&network).is_ok());
        assert_eq!(network.edges.len(), 12);
        assert!(network.od_pairs.iter().all(|od| od.origin != od.destination));
        assert_eq!(network, random_network(6, 12, 4, 7));
    }
}
