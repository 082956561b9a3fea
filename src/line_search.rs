//! Bounded one-dimensional minimisation, used to pick the Frank-Wolfe step size.
//!
//! This is Brent's method restricted to an interval: parabolic interpolation
//! through the three best points when the fit is acceptable, golden-section
//! steps otherwise. Only function values are used.

/// Evaluation budget when the caller does not need a different one
pub const MAX_EVALUATIONS: usize = 500;

/// `(3 - sqrt(5)) / 2`
const GOLDEN: f64 = 0.381_966_011_250_105_1;

/// Find `x` in `[lower, upper]` minimising `f`, to within roughly `xatol`.
///
/// For a unimodal `f` this converges to the global minimum on the interval.
/// The endpoints themselves are never evaluated, so a minimum sitting on a
/// bound is approached to within the tolerance.
pub fn minimize_bounded<F: FnMut(f64) -> f64>(
    mut f: F,
    lower: f64,
    upper: f64,
    xatol: f64,
    max_evaluations: usize,
) -> f64 {
    let sqrt_eps = f64::EPSILON.sqrt();
    let (mut a, mut b) = (lower, upper);

    // x: best point so far, w: second best, v: previous value of w
    let mut x = a + GOLDEN * (b - a);
    let mut fx = f(x);
    let (mut w, mut fw) = (x, fx);
    let (mut v, mut fv) = (x, fx);
    let mut d = 0.0f64;
    let mut e = 0.0f64;
    let mut evaluations = 1;

    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * x.abs() + xatol / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (x - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden = true;
        if e.abs() > tol1 {
            // Try a parabola through x, w, v
            let r = (x - w) * (fx - fv);
            let q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            let mut q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let e_prev = e;
            e = d;
            if p.abs() < (0.5 * q * e_prev).abs() && p > q * (a - x) && p < q * (b - x) {
                golden = false;
                d = p / q;
                let u = x + d;
                // Don't evaluate too close to the bounds
                if u - a < tol2 || b - u < tol2 {
                    d = if xm >= x { tol1 } else { -tol1 };
                }
            }
        }
        if golden {
            e = if x >= xm { a - x } else { b - x };
            d = GOLDEN * e;
        }

        let step = if d >= 0.0 { d.abs().max(tol1) } else { -d.abs().max(tol1) };
        let u = x + step;
        let fu = f(u);
        evaluations += 1;

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            (v, fv) = (w, fw);
            (w, fw) = (x, fx);
            (x, fx) = (u, fu);
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                (v, fv) = (w, fw);
                (w, fw) = (u, fu);
            } else if fu <= fv || v == x || v == w {
                (v, fv) = (u, fu);
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * x.abs() + xatol / 3.0;
        tol2 = 2.0 * tol1;
        if evaluations >= max_evaluations {
            break;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_quadratic() {
        let x = minimize_bounded(|x| (x - 0.3).powi(2), 0.0, 1.0, 1e-8, MAX_EVALUATIONS);
        assert!((x - 0.3).abs() < 1e-6, "{x}");
    }

    #[test]
    fn test_minimum_on_bounds() {
        let x = minimize_bounded(|x| x, 0.0, 1.0, 1e-5, MAX_EVALUATIONS);
        assert!(x < 1e-4, "{x}");
        let x = minimize_bounded(|x| -x, 0.0, 1.0, 1e-5, MAX_EVALUATIONS);
        assert!(x > 1.0 - 1e-4, "{x}");
    }

    #[test]
    fn test_non_smooth_convex() {
        let x = minimize_bounded(|x: f64| (x - 0.71).abs() + 0.5 * (x - 0.71).powi(4), 0.0, 1.0, 1e-7, MAX_EVALUATIONS);
        assert!((x - 0.71).abs() < 1e-5, "{x}");
    }

    #[test]
    fn test_budget_is_respected() {
        let mut calls = 0;
        minimize_bounded(|x| { calls += 1; (x - 0.5).powi(2) }, 0.0, 1.0, 0.0, 10);
        assert!(calls <= 10);
    }
}
