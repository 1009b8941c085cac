//! Adaptive Dormand–Prince 5(4) integrator with dense output.
//!
//! Each step evaluates seven stages (the last one reused as the first stage
//! of the next step), advances with the fifth-order solution and estimates
//! the local error from the embedded fourth-order one. Step sizes come from
//! the error estimate alone; requested sample times are filled in with the
//! fourth-order continuous extension of the step that brackets them.
//!
//! Coefficients follow Dormand & Prince (1980) and the dense output of
//! Hairer, Nørsett & Wanner, *Solving Ordinary Differential Equations I*.

use crate::error::{Error, Result};

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights; b2 = b7 = 0.
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between the fifth- and fourth-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339_200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// Dense output.
const D1: f64 = -12_715_105_075.0 / 11_282_082_432.0;
const D3: f64 = 87_487_479_700.0 / 32_700_410_799.0;
const D4: f64 = -10_690_763_975.0 / 1_880_347_072.0;
const D5: f64 = 701_980_252_875.0 / 199_316_789_632.0;
const D6: f64 = -1_453_857_185.0 / 822_651_844.0;
const D7: f64 = 69_997_945.0 / 29_380_423.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
/// `1 / (q + 1)` for the fourth-order error estimator.
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Default relative tolerance.
pub const DEFAULT_RTOL: f64 = 1e-3;
/// Default absolute tolerance.
pub const DEFAULT_ATOL: f64 = 1e-6;
/// Default step budget per integration.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Error-control settings for the adaptive integrator.
///
/// The defaults (`rtol = 1e-3`, `atol = 1e-6`) match the usual library
/// defaults for RK45 and are what the interactive viewer uses.
///
/// # Example
///
/// ```rust
/// use pendulum::SolverOptions;
///
/// let precise = SolverOptions {
///     rtol: 1e-9,
///     atol: 1e-12,
///     ..SolverOptions::default()
/// };
/// assert!(precise.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Relative tolerance on each state component.
    pub rtol: f64,
    /// Absolute tolerance on each state component.
    pub atol: f64,
    /// Maximum number of attempted steps (accepted plus rejected).
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl SolverOptions {
    /// Checks that tolerances are finite and positive and the step budget is
    /// non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(Error::InvalidOptions(format!(
                "rtol must be a finite positive number, got {}",
                self.rtol
            )));
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(Error::InvalidOptions(format!(
                "atol must be a finite positive number, got {}",
                self.atol
            )));
        }
        if self.max_steps == 0 {
            return Err(Error::InvalidOptions("max_steps must be at least 1".into()));
        }
        Ok(())
    }
}

/// Work counters for one integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Stats {
    pub accepted: usize,
    pub rejected: usize,
    pub evaluations: usize,
}

/// Solution values at each requested time, plus work counters.
#[derive(Debug, Clone)]
pub(crate) struct Solution<const D: usize> {
    pub samples: Vec<[f64; D]>,
    pub stats: Stats,
}

/// Stage derivatives and results of a single trial step.
struct Step<const D: usize> {
    y_new: [f64; D],
    k: [[f64; D]; 7],
    error: [f64; D],
}

/// Integrates `y' = f(t, y)` from `t_eval[0]` and samples the solution at
/// every time in `t_eval`.
///
/// `t_eval` must be non-decreasing. Samples equal to `t_eval[0]` receive
/// `y0` unchanged.
pub(crate) fn solve<const D: usize, F>(
    mut f: F,
    t_eval: &[f64],
    y0: [f64; D],
    options: &SolverOptions,
) -> Result<Solution<D>>
where
    F: FnMut(f64, &[f64; D]) -> [f64; D],
{
    options.validate()?;

    let mut stats = Stats::default();
    let mut samples = Vec::with_capacity(t_eval.len());

    let (Some(&t0), Some(&t_end)) = (t_eval.first(), t_eval.last()) else {
        return Ok(Solution { samples, stats });
    };

    let mut next = 0;
    while next < t_eval.len() && t_eval[next] <= t0 {
        samples.push(y0);
        next += 1;
    }
    if next == t_eval.len() {
        return Ok(Solution { samples, stats });
    }

    let mut t = t0;
    let mut y = y0;
    let mut k1 = f(t, &y);
    stats.evaluations += 1;

    let mut h = initial_step(&mut f, t, &y, &k1, t_end - t0, options, &mut stats);
    let mut rejected_last = false;

    while next < t_eval.len() {
        if stats.accepted + stats.rejected >= options.max_steps {
            return Err(Error::StepLimitExceeded {
                steps: options.max_steps,
                time: t,
            });
        }

        let min_step = 10.0 * f64::EPSILON * t.abs();
        if !(h > min_step) {
            return Err(Error::NumericInstability {
                time: t,
                reason: "step size underflow",
            });
        }

        let (t_new, h_step) = if t + h >= t_end {
            (t_end, t_end - t)
        } else {
            (t + h, h)
        };

        let step = dopri_step(&mut f, t, &y, &k1, h_step);
        stats.evaluations += 6;

        let err = error_norm(&y, &step.y_new, &step.error, options);

        if err < 1.0 {
            if !step.y_new.iter().all(|v| v.is_finite()) {
                return Err(Error::NumericInstability {
                    time: t_new,
                    reason: "state became non-finite",
                });
            }

            while next < t_eval.len() && t_eval[next] <= t_new {
                let sample = if t_eval[next] == t_new {
                    step.y_new
                } else {
                    dense_output(&y, &step, h_step, (t_eval[next] - t) / h_step)
                };
                samples.push(sample);
                next += 1;
            }

            let mut factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
            };
            if rejected_last {
                factor = factor.min(1.0);
            }

            t = t_new;
            y = step.y_new;
            k1 = step.k[6];
            h = h_step * factor;
            rejected_last = false;
            stats.accepted += 1;
        } else {
            // NaN lands here too and shrinks the step as hard as allowed.
            let factor = if err.is_finite() {
                (SAFETY * err.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
            } else {
                MIN_FACTOR
            };
            h = h_step * factor;
            rejected_last = true;
            stats.rejected += 1;
        }
    }

    Ok(Solution { samples, stats })
}

/// Runs the six new stages of one Dormand–Prince step of size `h`.
fn dopri_step<const D: usize, F>(
    f: &mut F,
    t: f64,
    y: &[f64; D],
    k1: &[f64; D],
    h: f64,
) -> Step<D>
where
    F: FnMut(f64, &[f64; D]) -> [f64; D],
{
    let k2 = f(t + C2 * h, &combine(y, h, &[(A21, k1)]));
    let k3 = f(t + C3 * h, &combine(y, h, &[(A31, k1), (A32, &k2)]));
    let k4 = f(
        t + C4 * h,
        &combine(y, h, &[(A41, k1), (A42, &k2), (A43, &k3)]),
    );
    let k5 = f(
        t + C5 * h,
        &combine(y, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
    );
    let k6 = f(
        t + h,
        &combine(
            y,
            h,
            &[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
        ),
    );
    let y_new = combine(
        y,
        h,
        &[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
    );
    let k7 = f(t + h, &y_new);

    let zero = [0.0; D];
    let error = combine(
        &zero,
        h,
        &[
            (E1, k1),
            (E3, &k3),
            (E4, &k4),
            (E5, &k5),
            (E6, &k6),
            (E7, &k7),
        ],
    );

    Step {
        y_new,
        k: [*k1, k2, k3, k4, k5, k6, k7],
        error,
    }
}

/// `base + h · Σ coef·k`.
#[inline]
fn combine<const D: usize>(base: &[f64; D], h: f64, terms: &[(f64, &[f64; D])]) -> [f64; D] {
    let mut out = *base;
    for (i, value) in out.iter_mut().enumerate() {
        let sum: f64 = terms.iter().map(|(coef, k)| coef * k[i]).sum();
        *value += h * sum;
    }
    out
}

/// Root-mean-square of the error scaled by the mixed tolerance.
fn error_norm<const D: usize>(
    y: &[f64; D],
    y_new: &[f64; D],
    error: &[f64; D],
    options: &SolverOptions,
) -> f64 {
    let scaled: [f64; D] = core::array::from_fn(|i| {
        let scale = options.atol + options.rtol * y[i].abs().max(y_new[i].abs());
        error[i] / scale
    });
    rms(&scaled)
}

/// Evaluates the continuous extension at `theta ∈ [0, 1]` of the step.
fn dense_output<const D: usize>(y: &[f64; D], step: &Step<D>, h: f64, theta: f64) -> [f64; D] {
    let k = &step.k;
    let theta1 = 1.0 - theta;
    core::array::from_fn(|i| {
        let ydiff = step.y_new[i] - y[i];
        let bspl = h * k[0][i] - ydiff;
        let r4 = ydiff - h * k[6][i] - bspl;
        let r5 = h
            * (D1 * k[0][i]
                + D3 * k[2][i]
                + D4 * k[3][i]
                + D5 * k[4][i]
                + D6 * k[5][i]
                + D7 * k[6][i]);
        y[i] + theta * (ydiff + theta1 * (bspl + theta * (r4 + theta1 * r5)))
    })
}

/// Picks the first step from the local behaviour of the solution.
///
/// Follows the heuristic of Hairer, Nørsett & Wanner (II.4): compare the
/// size of the state, its derivative and an estimate of the second
/// derivative against the tolerances.
#[allow(clippy::too_many_arguments)]
fn initial_step<const D: usize, F>(
    f: &mut F,
    t0: f64,
    y0: &[f64; D],
    f0: &[f64; D],
    interval: f64,
    options: &SolverOptions,
    stats: &mut Stats,
) -> f64
where
    F: FnMut(f64, &[f64; D]) -> [f64; D],
{
    let scale: [f64; D] = core::array::from_fn(|i| options.atol + y0[i].abs() * options.rtol);

    let d0 = rms::<D>(&core::array::from_fn(|i| y0[i] / scale[i]));
    let d1 = rms::<D>(&core::array::from_fn(|i| f0[i] / scale[i]));

    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    }
    .min(interval);

    let y1 = combine(y0, h0, &[(1.0, f0)]);
    let f1 = f(t0 + h0, &y1);
    stats.evaluations += 1;

    let d2 = rms::<D>(&core::array::from_fn(|i| (f1[i] - f0[i]) / scale[i])) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(-ERROR_EXPONENT)
    };

    (100.0 * h0).min(h1).min(interval)
}

#[allow(clippy::cast_precision_loss)]
fn rms<const D: usize>(values: &[f64; D]) -> f64 {
    (values.iter().map(|v| v * v).sum::<f64>() / D as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn linspace(end: f64, n: usize) -> Vec<f64> {
        let mut t: Vec<f64> = (0..n).map(|i| i as f64 * end / (n - 1) as f64).collect();
        t[n - 1] = end;
        t
    }

    fn tight() -> SolverOptions {
        SolverOptions {
            rtol: 1e-8,
            atol: 1e-12,
            ..SolverOptions::default()
        }
    }

    #[test]
    fn test_tableau_rows_sum_to_nodes() {
        assert!((A21 - C2).abs() < 1e-15);
        assert!((A31 + A32 - C3).abs() < 1e-15);
        assert!((A41 + A42 + A43 - C4).abs() < 1e-14);
        assert!((A51 + A52 + A53 + A54 - C5).abs() < 1e-14);
        assert!((A61 + A62 + A63 + A64 + A65 - 1.0).abs() < 1e-14);
        assert!((B1 + B3 + B4 + B5 + B6 - 1.0).abs() < 1e-15);
        assert!((E1 + E3 + E4 + E5 + E6 + E7).abs() < 1e-15);
    }

    #[test]
    fn test_initial_step_is_positive_and_bounded() {
        let mut stats = Stats::default();
        let mut f = |_: f64, y: &[f64; 2]| [y[1], -y[0]];
        let y0 = [1.0, 0.0];
        let f0 = f(0.0, &y0);
        let h = initial_step(&mut f, 0.0, &y0, &f0, 5.0, &SolverOptions::default(), &mut stats);
        assert!(h.is_finite() && h > 0.0 && h <= 5.0, "h = {h}");
        assert_eq!(stats.evaluations, 1);

        let h = initial_step(&mut f, 0.0, &y0, &f0, 1e-4, &SolverOptions::default(), &mut stats);
        assert!(h <= 1e-4);
    }

    #[test]
    fn test_exponential_decay() {
        let t = linspace(2.0, 50);
        let sol = solve(|_, y: &[f64; 1]| [-y[0]], &t, [1.0], &tight()).unwrap();
        assert_eq!(sol.samples.len(), t.len());
        for (ti, yi) in t.iter().zip(&sol.samples) {
            assert!(
                (yi[0] - (-ti).exp()).abs() < 1e-6,
                "t={ti}: got {}, expected {}",
                yi[0],
                (-ti).exp()
            );
        }
    }

    #[test]
    fn test_harmonic_oscillator_dense_output() {
        let t = linspace(10.0, 200);
        let options = SolverOptions {
            rtol: 1e-6,
            atol: 1e-9,
            ..SolverOptions::default()
        };
        let sol = solve(|_, y: &[f64; 2]| [y[1], -y[0]], &t, [1.0, 0.0], &options).unwrap();
        for (ti, yi) in t.iter().zip(&sol.samples) {
            assert!((yi[0] - ti.cos()).abs() < 1e-4, "t={ti}");
            assert!((yi[1] + ti.sin()).abs() < 1e-4, "t={ti}");
        }
    }

    #[test]
    fn test_first_sample_is_initial_value() {
        let t = linspace(1.0, 10);
        let sol = solve(|_, y: &[f64; 2]| [y[1], -y[0]], &t, [0.3, -0.7], &SolverOptions::default())
            .unwrap();
        assert_eq!(sol.samples[0], [0.3, -0.7]);
    }

    #[test]
    fn test_step_count_independent_of_sample_count() {
        let options = SolverOptions::default();
        let rhs = |_: f64, y: &[f64; 2]| [y[1], -y[0]];
        let coarse = solve(rhs, &linspace(5.0, 2), [1.0, 0.0], &options).unwrap();
        let fine = solve(rhs, &linspace(5.0, 500), [1.0, 0.0], &options).unwrap();
        assert_eq!(coarse.stats.accepted, fine.stats.accepted);
        assert_eq!(coarse.samples[1], fine.samples[499]);
    }

    #[test]
    fn test_zero_derivative_takes_few_steps() {
        let t = linspace(20.0, 100);
        let sol = solve(|_, _: &[f64; 2]| [0.0, 0.0], &t, [1.0, 2.0], &SolverOptions::default())
            .unwrap();
        assert!(sol.samples.iter().all(|y| *y == [1.0, 2.0]));
        assert_eq!(sol.stats.rejected, 0);
        assert!(sol.stats.accepted < 20);
    }

    #[test]
    fn test_step_limit_is_enforced() {
        let options = SolverOptions {
            max_steps: 3,
            ..tight()
        };
        let err = solve(
            |_, y: &[f64; 2]| [y[1], -y[0]],
            &linspace(100.0, 10),
            [1.0, 0.0],
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, Error::StepLimitExceeded { steps: 3, .. }));
    }

    #[test]
    fn test_blow_up_is_reported_not_returned() {
        // y' = y², y(0) = 1 diverges at t = 1.
        let err = solve(
            |_, y: &[f64; 1]| [y[0] * y[0]],
            &linspace(2.0, 10),
            [1.0],
            &SolverOptions::default(),
        )
        .unwrap_err();
        assert!(
            matches!(
                err,
                Error::NumericInstability { .. } | Error::StepLimitExceeded { .. }
            ),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn test_rejects_invalid_options() {
        let bad = SolverOptions {
            rtol: 0.0,
            ..SolverOptions::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidOptions(_))));
        let bad = SolverOptions {
            atol: f64::NAN,
            ..SolverOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = SolverOptions {
            max_steps: 0,
            ..SolverOptions::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_empty_request() {
        let sol = solve(|_, y: &[f64; 1]| *y, &[], [1.0], &SolverOptions::default()).unwrap();
        assert!(sol.samples.is_empty());
    }
}
