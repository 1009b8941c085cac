//! Integrated motion and its Cartesian view.
//!
//! # Example
//!
//! ```rust
//! use pendulum::{integrate, PendulumParameters, TimeGrid};
//!
//! let params = PendulumParameters::default();
//! let grid = TimeGrid::new(5.0, 250).unwrap();
//! let trajectory = integrate(&params, &grid).unwrap();
//!
//! for frame in trajectory.frames().take(3) {
//!     println!("bob2 at ({:.3}, {:.3})", frame.bob2.x, frame.bob2.y);
//! }
//! ```

use core::ops::{Add, Sub};

use crate::dynamics::{self, State};
use crate::error::Result;
use crate::params::{PendulumParameters, TimeGrid};
use crate::solver::{self, SolverOptions};

/// A point in the plane of motion, y up, pivot at the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Point {
    /// Horizontal coordinate (m).
    pub x: f64,
    /// Vertical coordinate (m), negative below the pivot.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The pivot.
    #[inline]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// The three joints drawn for one sample: pivot, upper bob, lower bob.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Frame {
    /// Fixed pivot, always `(0, 0)`.
    pub origin: Point,
    /// End of the upper link.
    pub bob1: Point,
    /// End of the lower link.
    pub bob2: Point,
}

impl Frame {
    /// Points in drawing order for a connected polyline.
    #[inline]
    pub const fn polyline(&self) -> [Point; 3] {
        [self.origin, self.bob1, self.bob2]
    }
}

/// Positions of both bobs for a given state.
///
/// `x1 = l1 sin θ1`, `y1 = −l1 cos θ1`, `x2 = x1 + l2 sin θ2`,
/// `y2 = y1 − l2 cos θ2`.
pub fn forward_kinematics(params: &PendulumParameters, state: &State) -> (Point, Point) {
    let (sin1, cos1) = state.theta1.sin_cos();
    let (sin2, cos2) = state.theta2.sin_cos();
    let bob1 = Point::new(params.l1() * sin1, -params.l1() * cos1);
    let bob2 = Point::new(bob1.x + params.l2() * sin2, bob1.y - params.l2() * cos2);
    (bob1, bob2)
}

/// Work done by the solver for one trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostics {
    /// Steps that met the error tolerance.
    pub accepted_steps: usize,
    /// Steps retried with a smaller size.
    pub rejected_steps: usize,
    /// Evaluations of the equations of motion.
    pub rhs_evaluations: usize,
    /// Evaluations whose denominator had to be clamped.
    pub clamped_denominators: usize,
}

/// The full motion for one parameter set, sampled on a [`TimeGrid`].
///
/// A trajectory is never modified after it is built. Consumers that need a
/// different motion build a new one with [`integrate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    params: PendulumParameters,
    times: Vec<f64>,
    states: Vec<State>,
    bob1: Vec<Point>,
    bob2: Vec<Point>,
    diagnostics: Diagnostics,
}

impl Trajectory {
    /// Number of samples; equals the length of the grid it was built on.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the trajectory holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The parameters this motion was computed from.
    #[inline]
    pub const fn params(&self) -> &PendulumParameters {
        &self.params
    }

    /// Sample times.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Generalized coordinates at each sample.
    #[inline]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Upper bob position at sample `index`.
    #[inline]
    pub fn bob1(&self, index: usize) -> Option<Point> {
        self.bob1.get(index).copied()
    }

    /// Lower bob position at sample `index`.
    #[inline]
    pub fn bob2(&self, index: usize) -> Option<Point> {
        self.bob2.get(index).copied()
    }

    /// Everything needed to draw sample `index`.
    pub fn frame(&self, index: usize) -> Option<Frame> {
        Some(Frame {
            origin: Point::origin(),
            bob1: self.bob1(index)?,
            bob2: self.bob2(index)?,
        })
    }

    /// Frames in sample order.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        self.bob1.iter().zip(&self.bob2).map(|(&bob1, &bob2)| Frame {
            origin: Point::origin(),
            bob1,
            bob2,
        })
    }

    /// Solver work counters.
    #[inline]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

/// Integrates the equations of motion over `grid` with default tolerances.
///
/// Pure and deterministic: identical inputs yield identical trajectories.
///
/// # Errors
///
/// Parameters are validated when constructed, so with default options this
/// only fails with [`Error::NumericInstability`](crate::Error::NumericInstability)
/// or [`Error::StepLimitExceeded`](crate::Error::StepLimitExceeded) for
/// pathological inputs.
pub fn integrate(params: &PendulumParameters, grid: &TimeGrid) -> Result<Trajectory> {
    integrate_with(params, grid, &SolverOptions::default())
}

/// Integrates the equations of motion over `grid` with explicit options.
///
/// # Errors
///
/// Returns [`Error::InvalidOptions`](crate::Error::InvalidOptions) for bad
/// tolerances, and the solver failures listed on [`integrate`].
pub fn integrate_with(
    params: &PendulumParameters,
    grid: &TimeGrid,
    options: &SolverOptions,
) -> Result<Trajectory> {
    let mut clamped = 0usize;
    let sol = solver::solve(
        |_, y: &[f64; 4]| {
            let (d, was_clamped) = dynamics::derivative(params, y);
            clamped += usize::from(was_clamped);
            d
        },
        grid.times(),
        State::initial(params).to_array(),
        options,
    )?;

    let states: Vec<State> = sol.samples.into_iter().map(State::from_array).collect();
    let (bob1, bob2): (Vec<Point>, Vec<Point>) = states
        .iter()
        .map(|s| forward_kinematics(params, s))
        .unzip();

    let diagnostics = Diagnostics {
        accepted_steps: sol.stats.accepted,
        rejected_steps: sol.stats.rejected,
        rhs_evaluations: sol.stats.evaluations,
        clamped_denominators: clamped,
    };

    tracing::debug!(
        samples = states.len(),
        accepted = diagnostics.accepted_steps,
        rejected = diagnostics.rejected_steps,
        evaluations = diagnostics.rhs_evaluations,
        "integrated double pendulum"
    );
    if clamped > 0 {
        tracing::warn!(clamped, "equation-of-motion denominator clamped");
    }

    Ok(Trajectory {
        params: *params,
        times: grid.times().to_vec(),
        states,
        bob1,
        bob2,
        diagnostics,
    })
}
