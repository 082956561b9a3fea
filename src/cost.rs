//! Edge cost functions: the travel cost of an edge as a function of the flow on it.
//!
//! Both families are evaluable, differentiable and integrable in closed form,
//! which is all the solver needs. Degenerate inputs (zero flow, zero exponent,
//! zero capacity) resolve to fixed fallback values rather than panicking.

use serde::{Deserialize, Serialize};

/// A cost function descriptor, tagged by `function_type` in input files.
///
/// Unknown tags are rejected when the network is deserialised.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "function_type", rename_all = "lowercase")]
pub enum CostFunction {
    /// `t(f) = a * f^k + b`
    Polynomial {
        #[serde(default = "one")]
        a: f64,
        #[serde(default = "one")]
        k: f64,
        #[serde(default)]
        b: f64,
    },
    /// Bureau of Public Roads curve: `t(f) = T * (1 + alpha * (f / C)^beta)`
    Bpr {
        #[serde(default = "one")]
        free_flow_time: f64,
        #[serde(default = "one")]
        capacity: f64,
        #[serde(default = "default_alpha")]
        alpha: f64,
        #[serde(default = "default_beta")]
        beta: f64,
    },
}

fn one() -> f64 {
    1.0
}

fn default_alpha() -> f64 {
    0.15
}

fn default_beta() -> f64 {
    4.0
}

impl Default for CostFunction {
    fn default() -> Self {
        CostFunction::Polynomial { a: 1.0, k: 1.0, b: 0.0 }
    }
}

impl CostFunction {
    /// Linear cost `a * f + b`, the most common case in small examples
    pub fn linear(a: f64, b: f64) -> Self {
        CostFunction::Polynomial { a, k: 1.0, b }
    }

    /// BPR curve with the customary `alpha = 0.15`, `beta = 4`
    pub fn bpr(free_flow_time: f64, capacity: f64) -> Self {
        CostFunction::Bpr { free_flow_time, capacity, alpha: default_alpha(), beta: default_beta() }
    }

    /// Travel cost of one unit of flow when `flow` units use the edge
    pub fn cost(&self, flow: f64) -> f64 {
        match *self {
            CostFunction::Polynomial { a, k, b } => a * flow.powf(k) + b,
            CostFunction::Bpr { free_flow_time, capacity, alpha, beta } => {
                let ratio = if capacity > 0.0 { flow / capacity } else { 0.0 };
                free_flow_time * (1.0 + alpha * ratio.powf(beta))
            }
        }
    }

    /// `dt/df`
    pub fn derivative(&self, flow: f64) -> f64 {
        match *self {
            CostFunction::Polynomial { a, k, .. } => {
                // f^(k-1) is singular at zero flow for k < 1
                if k == 0.0 || flow == 0.0 {
                    return 0.0;
                }
                a * k * flow.powf(k - 1.0)
            }
            CostFunction::Bpr { free_flow_time, capacity, alpha, beta } => {
                if capacity <= 0.0 {
                    return 0.0;
                }
                let ratio = flow / capacity;
                free_flow_time * alpha * beta * ratio.powf(beta - 1.0) / capacity
            }
        }
    }

    /// Cost a marginal traveller adds to the system: `t(f) + f * t'(f)`
    pub fn marginal_cost(&self, flow: f64) -> f64 {
        self.cost(flow) + flow * self.derivative(flow)
    }

    /// `∫ t(s) ds` over `[0, flow]`, the per-edge term of the Beckmann potential
    pub fn integral(&self, flow: f64) -> f64 {
        match *self {
            CostFunction::Polynomial { a, k, b } => a * flow.powf(k + 1.0) / (k + 1.0) + b * flow,
            CostFunction::Bpr { free_flow_time, capacity, alpha, beta } => {
                if capacity <= 0.0 {
                    return free_flow_time * flow;
                }
                free_flow_time * flow
                    + free_flow_time * alpha * flow.powf(beta + 1.0)
                        / ((beta + 1.0) * capacity.powf(beta))
            }
        }
    }

    /// Evaluate the cost the solver steers by: actual cost for equilibrium,
    /// marginal cost for the system optimum
    pub fn steering_cost(&self, flow: f64, marginal: bool) -> f64 {
        if marginal {
            self.marginal_cost(flow)
        } else {
            self.cost(flow)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_polynomial_values() {
        let c = CostFunction::Polynomial { a: 2.0, k: 2.0, b: 3.0 };
        assert!((c.cost(3.0) - 21.0).abs() < EPS);
        assert!((c.derivative(3.0) - 12.0).abs() < EPS);
        assert!((c.marginal_cost(3.0) - (21.0 + 36.0)).abs() < EPS);
        // 2 * 27 / 3 + 9
        assert!((c.integral(3.0) - 27.0).abs() < EPS);
    }

    #[test]
    fn test_polynomial_degenerate() {
        let sqrt = CostFunction::Polynomial { a: 1.0, k: 0.5, b: 0.0 };
        assert_eq!(sqrt.derivative(0.0), 0.0);
        let constant = CostFunction::Polynomial { a: 4.0, k: 0.0, b: 1.0 };
        assert_eq!(constant.derivative(7.0), 0.0);
        assert!((constant.cost(7.0) - 5.0).abs() < EPS);
        assert!((constant.integral(2.0) - 10.0).abs() < EPS);
    }

    #[test]
    fn test_bpr_at_capacity() {
        let c = CostFunction::Bpr { free_flow_time: 1.0, capacity: 10.0, alpha: 0.15, beta: 4.0 };
        assert!((c.cost(10.0) - 1.15).abs() < EPS);
        // T * alpha * beta / C
        assert!((c.derivative(10.0) - 0.06).abs() < EPS);
        // T * f + T * alpha * f / (beta + 1)
        assert!((c.integral(10.0) - (10.0 + 0.3)).abs() < EPS);
    }

    #[test]
    fn test_bpr_zero_capacity() {
        let c = CostFunction::Bpr { free_flow_time: 2.0, capacity: 0.0, alpha: 0.15, beta: 4.0 };
        assert!((c.cost(50.0) - 2.0).abs() < EPS);
        assert_eq!(c.derivative(50.0), 0.0);
        assert!((c.integral(50.0) - 100.0).abs() < EPS);
        assert!((c.marginal_cost(50.0) - 2.0).abs() < EPS);
    }

    #[test]
    fn test_integral_matches_numeric_quadrature() {
        let functions = [
            CostFunction::Polynomial { a: 0.5, k: 3.0, b: 2.0 },
            CostFunction::bpr(3.0, 7.0),
        ];
        for c in functions {
            let upper = 9.0;
            let steps = 20_000;
            let h = upper / steps as f64;
            // midpoint rule
            let numeric: f64 = (0..steps).map(|i| c.cost((i as f64 + 0.5) * h) * h).sum();
            assert!((numeric - c.integral(upper)).abs() < 1e-4, "{c:?}");
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let res = serde_json::from_str::<CostFunction>(r#"{"function_type": "cubic", "a": 1.0}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_defaults_filled() {
        let c: CostFunction = serde_json::from_str(r#"{"function_type": "bpr", "capacity": 5.0}"#).unwrap();
        assert_eq!(c, CostFunction::Bpr { free_flow_time: 1.0, capacity: 5.0, alpha: 0.15, beta: 4.0 });
    }
}
