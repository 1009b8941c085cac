//! Equations of motion for the planar double pendulum.
//!
//! The state vector is ordered `[θ1, ω1, θ2, ω2]`. With `Δ = θ2 − θ1`:
//!
//! ```text
//! ω1' = [ m2·l1·ω1²·sinΔ·cosΔ + m2·g·sinθ2·cosΔ + m2·l2·ω2²·sinΔ − (m1+m2)·g·sinθ1 ] / D1
//! ω2' = [ −m2·l2·ω2²·sinΔ·cosΔ + (m1+m2)·g·sinθ1·cosΔ
//!         − (m1+m2)·l1·ω1²·sinΔ − (m1+m2)·g·sinθ2 ] / D2
//! D1  = (m1+m2)·l1 − m2·l1·cos²Δ
//! D2  = (l2/l1)·D1
//! ```
//!
//! # Near-singular denominators
//!
//! `D1` simplifies to `l1·(m1 + m2·sin²Δ)`, so it is bounded below by
//! `l1·m1` for any validated parameter set. Should it still fall under
//! [`DENOMINATOR_EPSILON`] it is clamped to that magnitude. The clamp keeps
//! the derivative finite but can produce a large angular-velocity spike; it is
//! counted in [`Diagnostics`](crate::Diagnostics) rather than corrected.

use crate::params::PendulumParameters;

/// Gravitational acceleration in m/s².
pub const G: f64 = 9.81;

/// Smallest denominator magnitude used when evaluating the accelerations.
pub const DENOMINATOR_EPSILON: f64 = 1e-9;

/// Generalized coordinates and angular velocities at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct State {
    /// Angle of the upper link (rad).
    pub theta1: f64,
    /// Angular velocity of the upper link (rad/s).
    pub omega1: f64,
    /// Angle of the lower link (rad).
    pub theta2: f64,
    /// Angular velocity of the lower link (rad/s).
    pub omega2: f64,
}

impl State {
    /// Creates a state from its four components.
    #[inline]
    pub const fn new(theta1: f64, omega1: f64, theta2: f64, omega2: f64) -> Self {
        Self {
            theta1,
            omega1,
            theta2,
            omega2,
        }
    }

    /// The initial state for a parameter set: both links at rest.
    #[inline]
    pub const fn initial(params: &PendulumParameters) -> Self {
        Self::new(params.theta1_0(), 0.0, params.theta2_0(), 0.0)
    }

    #[inline]
    pub(crate) const fn to_array(self) -> [f64; 4] {
        [self.theta1, self.omega1, self.theta2, self.omega2]
    }

    #[inline]
    pub(crate) const fn from_array(y: [f64; 4]) -> Self {
        Self::new(y[0], y[1], y[2], y[3])
    }
}

/// Time derivative of `state`, ordered `[θ1', ω1', θ2', ω2']`.
///
/// # Example
///
/// ```rust
/// use pendulum::{rhs, PendulumParameters, State};
///
/// // Hanging straight down and at rest: nothing moves.
/// let params = PendulumParameters::new(1.0, 1.0, 1.0, 1.0, 0.0, 0.0).unwrap();
/// assert_eq!(rhs(&params, &State::initial(&params)), [0.0; 4]);
/// ```
pub fn rhs(params: &PendulumParameters, state: &State) -> [f64; 4] {
    derivative(params, &state.to_array()).0
}

/// Evaluates the equations of motion, reporting whether the denominator was
/// clamped.
pub(crate) fn derivative(params: &PendulumParameters, y: &[f64; 4]) -> ([f64; 4], bool) {
    let (l1, l2, m1, m2) = (params.l1(), params.l2(), params.m1(), params.m2());
    let [theta1, omega1, theta2, omega2] = *y;

    let delta = theta2 - theta1;
    let (sin_d, cos_d) = delta.sin_cos();
    let total = m1 + m2;

    let mut den1 = total * l1 - m2 * l1 * cos_d * cos_d;
    let clamped = den1.abs() < DENOMINATOR_EPSILON;
    if clamped {
        den1 = DENOMINATOR_EPSILON.copysign(den1);
    }
    let den2 = (l2 / l1) * den1;

    let domega1 = (m2 * l1 * omega1 * omega1 * sin_d * cos_d
        + m2 * G * theta2.sin() * cos_d
        + m2 * l2 * omega2 * omega2 * sin_d
        - total * G * theta1.sin())
        / den1;

    let domega2 = (-m2 * l2 * omega2 * omega2 * sin_d * cos_d
        + total * G * theta1.sin() * cos_d
        - total * l1 * omega1 * omega1 * sin_d
        - total * G * theta2.sin())
        / den2;

    ([omega1, domega1, omega2, domega2], clamped)
}

/// Total mechanical energy (kinetic plus potential) in joules.
///
/// The potential is measured from the pivot height, so a pendulum hanging at
/// rest has energy `−(m1+m2)·g·l1 − m2·g·l2`.
pub fn total_energy(params: &PendulumParameters, state: &State) -> f64 {
    let (l1, l2, m1, m2) = (params.l1(), params.l2(), params.m1(), params.m2());
    let State {
        theta1,
        omega1,
        theta2,
        omega2,
    } = *state;

    let kinetic = 0.5 * m1 * l1 * l1 * omega1 * omega1
        + 0.5
            * m2
            * (l1 * l1 * omega1 * omega1
                + l2 * l2 * omega2 * omega2
                + 2.0 * l1 * l2 * omega1 * omega2 * (theta1 - theta2).cos());
    let potential = -(m1 + m2) * G * l1 * theta1.cos() - m2 * G * l2 * theta2.cos();

    kinetic + potential
}
