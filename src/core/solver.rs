use tracing::trace;

use super::error::SolveError;
use super::types::SolverConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    pub iterations: u32,
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// A non-finite value is read as a saving rate that is too low and raises the
/// lower bound. A finite value with the reference sign lowers the upper bound.
pub fn find_bracket<F>(mut f: F, config: &SolverConfig) -> Result<Bracket, SolveError>
where
    F: FnMut(f64) -> f64,
{
    let s_min = config.edge_eps;
    let s_max = 1.0 - config.edge_eps;

    let value = f(s_max);
    let sign_max = sign(value);
    trace!(s = s_max, euler_error = value, "bracket reference");

    let mut lower = s_min;
    let mut upper = s_max;

    for _ in 0..config.bracket_max_iterations {
        let s = (lower + upper) / 2.0;
        let value = f(s);
        trace!(s, euler_error = value, "bracket probe");

        let valid = value.is_finite();
        let correct_sign = sign(value) * sign_max < 0.0;

        if valid && correct_sign {
            trace!(lower = s, upper, "bracket found");
            return Ok(Bracket { lower: s, upper });
        } else if !valid {
            lower = s;
        } else {
            upper = s;
        }
    }

    Err(SolveError::BracketNotFound {
        iterations: config.bracket_max_iterations,
    })
}

/// The final evaluation of `f` is always at the returned root.
pub fn bisect<F>(mut f: F, bracket: Bracket, config: &SolverConfig) -> Result<Root, SolveError>
where
    F: FnMut(f64) -> f64,
{
    let mut xa = bracket.lower;
    let xb = bracket.upper;
    let fa = f(xa);
    let fb = f(xb);

    if fa.is_nan() || fb.is_nan() || fa * fb > 0.0 {
        return Err(SolveError::NotBracketed {
            lower: xa,
            upper: xb,
        });
    }
    if fa == 0.0 {
        f(xa);
        return Ok(Root {
            x: xa,
            iterations: 0,
        });
    }
    if fb == 0.0 {
        return Ok(Root {
            x: xb,
            iterations: 0,
        });
    }

    let mut dm = xb - xa;
    for it in 1..=config.max_iterations {
        dm *= 0.5;
        let xm = xa + dm;
        let fm = f(xm);
        if fm * fa >= 0.0 {
            xa = xm;
        }
        if fm == 0.0 || dm.abs() < config.xtol + config.rtol * xm.abs() {
            return Ok(Root { x: xm, iterations: it });
        }
    }

    Err(SolveError::NotConverged {
        iterations: config.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn bisect_finds_square_root() {
        let config = SolverConfig::default();
        let root = bisect(
            |x| x * x - 2.0,
            Bracket {
                lower: 0.0,
                upper: 2.0,
            },
            &config,
        )
        .expect("must converge");
        assert_close(root.x, 2f64.sqrt(), 1e-11);
        assert!(root.iterations <= config.max_iterations);
    }

    #[test]
    fn bisect_rejects_interval_without_sign_change() {
        let err = bisect(
            |x| x * x + 1.0,
            Bracket {
                lower: -1.0,
                upper: 1.0,
            },
            &SolverConfig::default(),
        )
        .expect_err("no sign change");
        assert_eq!(
            err,
            SolveError::NotBracketed {
                lower: -1.0,
                upper: 1.0
            }
        );
    }

    #[test]
    fn bisect_rejects_nan_endpoint() {
        let err = bisect(
            |x| if x < 0.5 { f64::NAN } else { 1.0 },
            Bracket {
                lower: 0.1,
                upper: 0.9,
            },
            &SolverConfig::default(),
        )
        .expect_err("nan endpoint");
        assert!(matches!(err, SolveError::NotBracketed { .. }));
    }

    #[test]
    fn bisect_reports_iteration_cap() {
        let config = SolverConfig {
            max_iterations: 3,
            ..SolverConfig::default()
        };
        let err = bisect(
            |x| x - 0.123_456,
            Bracket {
                lower: 0.0,
                upper: 1.0,
            },
            &config,
        )
        .expect_err("too few iterations");
        assert_eq!(err, SolveError::NotConverged { iterations: 3 });
    }

    #[test]
    fn bisect_last_evaluation_is_at_the_root() {
        let mut last = f64::NAN;
        let root = bisect(
            |x| {
                last = x;
                x.powi(3) - 0.2
            },
            Bracket {
                lower: 0.0,
                upper: 1.0,
            },
            &SolverConfig::default(),
        )
        .expect("must converge");
        assert_eq!(last, root.x);
    }

    #[test]
    fn bracket_found_for_decreasing_function() {
        let config = SolverConfig::default();
        let f = |s: f64| 0.3 - s;
        let bracket = find_bracket(f, &config).expect("bracket exists");
        assert!(bracket.lower < bracket.upper);
        assert!(f(bracket.lower) * f(bracket.upper) < 0.0);
    }

    #[test]
    fn bracket_skips_non_finite_region() {
        let config = SolverConfig::default();
        let f = |s: f64| {
            if s < 0.15 {
                f64::NAN
            } else {
                1.0 / (1.0 - s) - 0.25 / s
            }
        };
        let bracket = find_bracket(f, &config).expect("bracket exists");
        let lo = f(bracket.lower);
        let hi = f(bracket.upper);
        assert!(lo.is_finite() && hi.is_finite());
        assert!(lo.signum() != hi.signum());
        assert!(bracket.lower >= 0.15);
    }

    #[test]
    fn bracket_not_found_without_sign_change() {
        let config = SolverConfig {
            bracket_max_iterations: 50,
            ..SolverConfig::default()
        };
        let mut calls = 0;
        let err = find_bracket(
            |_| {
                calls += 1;
                1.0
            },
            &config,
        )
        .expect_err("constant function");
        assert_eq!(err, SolveError::BracketNotFound { iterations: 50 });
        assert_eq!(calls, 51);
    }

    #[test]
    fn bracket_then_bisect_solves_euler_like_objective() {
        let config = SolverConfig::default();
        let f = |s: f64| (1.0 - s).powf(-2.0) - 4.0 * s.powf(-2.0);
        let bracket = find_bracket(f, &config).expect("bracket exists");
        let root = bisect(f, bracket, &config).expect("must converge");
        assert_close(root.x, 2.0 / 3.0, 1e-10);
    }
}
