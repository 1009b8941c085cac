#![forbid(unsafe_code)]
// Allow these clippy lints for physics/math code readability
#![allow(clippy::must_use_candidate)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::use_self)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::float_cmp)]

//! # Pendulum
//!
//! Dynamics of the two-link planar double pendulum.
//!
//! The crate provides:
//! - **[`PendulumParameters`]**: validated link lengths, bob masses and initial angles
//! - **[`TimeGrid`]**: the evenly spaced times at which motion is sampled
//! - **[`integrate`]**: an adaptive Dormand–Prince 5(4) solve of the equations of
//!   motion, returning a [`Trajectory`] of states and bob positions
//!
//! ## Example
//!
//! ```rust
//! use pendulum::{integrate, PendulumParameters, TimeGrid};
//!
//! let params = PendulumParameters::new(1.0, 1.0, 1.0, 1.0, 1.2, 2.0)?;
//! let grid = TimeGrid::default(); // 1000 samples over 20 s
//!
//! let trajectory = integrate(&params, &grid)?;
//! assert_eq!(trajectory.len(), grid.len());
//!
//! let first = trajectory.frame(0).unwrap();
//! println!("lower bob starts at ({:.2}, {:.2})", first.bob2.x, first.bob2.y);
//! # Ok::<(), pendulum::Error>(())
//! ```
//!
//! ## Accuracy
//!
//! The system is chaotic: nearby initial conditions separate exponentially,
//! so fixed coarse stepping drifts from the true motion within seconds. The
//! solver controls the local error of every step (relative `1e-3`, absolute
//! `1e-6` by default) and interpolates to the requested times, so the step
//! size is independent of how densely the grid is sampled. Pass tighter
//! [`SolverOptions`] to [`integrate_with`] for reference-quality output.

mod dynamics;
mod error;
mod params;
mod solver;
mod trajectory;

pub use dynamics::{DENOMINATOR_EPSILON, G, State, rhs, total_energy};
pub use error::{Error, Result};
pub use params::{DEFAULT_SAMPLES, DEFAULT_SPAN, MAX_SAMPLES, PendulumParameters, TimeGrid};
pub use solver::{DEFAULT_ATOL, DEFAULT_MAX_STEPS, DEFAULT_RTOL, SolverOptions};
pub use trajectory::{
    Diagnostics, Frame, Point, Trajectory, forward_kinematics, integrate, integrate_with,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::dynamics::State;
    pub use crate::params::{PendulumParameters, TimeGrid};
    pub use crate::solver::SolverOptions;
    pub use crate::trajectory::{Frame, Point, Trajectory, integrate, integrate_with};
}
