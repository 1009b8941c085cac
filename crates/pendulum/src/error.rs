//! Error types for the dynamics engine.

/// Errors reported by parameter validation and integration.
///
/// Every variant is raised before a [`Trajectory`](crate::Trajectory) is
/// handed out, so a caller holding a trajectory never sees partial or
/// non-finite data.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A link length or bob mass was not strictly positive, or an angle was
    /// not finite.
    #[error("invalid parameter {name}: {value} ({reason})")]
    InvalidParameter {
        /// Parameter name (`l1`, `l2`, `m1`, `m2`, `theta1_0`, `theta2_0`).
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// What the value must satisfy.
        reason: &'static str,
    },

    /// The time grid cannot be built from the requested span and sample count.
    #[error("invalid time grid: {0}")]
    InvalidGrid(String),

    /// Solver tolerances or limits are out of range.
    #[error("invalid solver options: {0}")]
    InvalidOptions(String),

    /// The solution left the representable range or the step size collapsed.
    ///
    /// This is the flagged form of the near-singular denominator case: the
    /// engine stops instead of passing NaN or infinity to a renderer.
    #[error("numeric instability at t={time:.6}s: {reason}")]
    NumericInstability {
        /// Simulation time at which integration stopped.
        time: f64,
        /// Short description of the failure.
        reason: &'static str,
    },

    /// The adaptive solver needed more steps than allowed.
    #[error("step limit of {steps} exceeded at t={time:.6}s")]
    StepLimitExceeded {
        /// The configured step budget.
        steps: usize,
        /// Simulation time reached when the budget ran out.
        time: f64,
    },
}

/// Result alias for the dynamics engine.
pub type Result<T> = std::result::Result<T, Error>;
