//! Solver configuration

use serde::{Deserialize, Serialize};

/// Parameters for the solver.
/// Varying these changes the quality and speed of the solution.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// The max iterations to run Frank-Wolfe for,
    /// provided it does not converge beforehand
    pub max_iterations: usize,
    /// Stop once no path flow changes by this much or more in one iteration
    pub tolerance: f64,
    /// Candidate paths longer than this many edges are not considered
    pub max_hops: usize,
    /// At most this many candidate paths are kept per OD pair
    pub max_paths: usize,
    /// Absolute tolerance on the step size found by the line search
    pub line_search_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            max_hops: 10,
            max_paths: 50,
            line_search_tolerance: 1e-5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SolverConfig = toml::from_str("max_paths = 5\ntolerance = 1e-3").unwrap();
        assert_eq!(config.max_paths, 5);
        assert_eq!(config.tolerance, 1e-3);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.max_hops, 10);
    }
}
