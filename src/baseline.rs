//! All-or-nothing assignment: every OD pair sends its whole demand down its
//! currently cheapest candidate path.
//!
//! On its own this is the crudest possible solver, and a useful baseline to
//! compare against. Frank-Wolfe uses it twice: as the starting point, and as
//! the search direction (a vertex of the feasible region) in every iteration.

use itertools::Itertools;
use ndarray::{s, Array1, ArrayView1};
use ordered_float::OrderedFloat;

use crate::assignment::OdPaths;

/// Route each group's demand onto its minimum-cost path.
/// Ties go to the path enumerated first; groups without paths get nothing.
pub fn all_or_nothing(groups: &[OdPaths], path_costs: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut flows = Array1::zeros(path_costs.len());
    for group in groups {
        let costs = path_costs.slice(s![group.paths.clone()]);
        if let Some(best) = costs.iter().position_min_by_key(|&&c| OrderedFloat(c)) {
            flows[group.paths.start + best] = group.demand;
        }
    }
    flows
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_cheapest_path_per_group() {
        let groups = vec![
            OdPaths { od: 0, demand: 4.0, paths: 0..3 },
            OdPaths { od: 1, demand: 2.5, paths: 3..5 },
            OdPaths { od: 2, demand: 9.0, paths: 5..5 },
        ];
        let costs = array![3.0, 1.0, 2.0, 7.0, 7.0];
        let flows = all_or_nothing(&groups, costs.view());
        // tie between 3 and 4 goes to the first
        assert_eq!(flows, array![0.0, 4.0, 0.0, 2.5, 0.0]);
    }
}
