//! Physical parameters and the sampling grid.
//!
//! Both types are validated on construction and immutable afterwards. A
//! presentation layer builds a fresh [`PendulumParameters`] on every control
//! change instead of editing one in place.

use core::f64::consts::FRAC_PI_2;

use crate::error::{Error, Result};

/// Lengths (m), masses (kg) and initial angles (rad) of a double pendulum.
///
/// Angles are measured from the downward vertical, counter-clockwise
/// positive. Both links start at rest.
///
/// # Example
///
/// ```rust
/// use pendulum::PendulumParameters;
///
/// let params = PendulumParameters::new(1.0, 1.5, 1.0, 0.5, 0.3, 0.1).unwrap();
/// assert_eq!(params.l2(), 1.5);
///
/// assert!(PendulumParameters::new(0.0, 1.0, 1.0, 1.0, 0.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PendulumParameters {
    l1: f64,
    l2: f64,
    m1: f64,
    m2: f64,
    theta1_0: f64,
    theta2_0: f64,
}

impl PendulumParameters {
    /// Validates and builds a parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when a length or mass is not a
    /// finite positive number, or when an angle is not finite.
    pub fn new(l1: f64, l2: f64, m1: f64, m2: f64, theta1_0: f64, theta2_0: f64) -> Result<Self> {
        positive("l1", l1)?;
        positive("l2", l2)?;
        positive("m1", m1)?;
        positive("m2", m2)?;
        finite("theta1_0", theta1_0)?;
        finite("theta2_0", theta2_0)?;

        Ok(Self {
            l1,
            l2,
            m1,
            m2,
            theta1_0,
            theta2_0,
        })
    }

    /// Length of the upper link.
    #[inline]
    pub const fn l1(&self) -> f64 {
        self.l1
    }

    /// Length of the lower link.
    #[inline]
    pub const fn l2(&self) -> f64 {
        self.l2
    }

    /// Mass of the upper bob.
    #[inline]
    pub const fn m1(&self) -> f64 {
        self.m1
    }

    /// Mass of the lower bob.
    #[inline]
    pub const fn m2(&self) -> f64 {
        self.m2
    }

    /// Initial angle of the upper link.
    #[inline]
    pub const fn theta1_0(&self) -> f64 {
        self.theta1_0
    }

    /// Initial angle of the lower link.
    #[inline]
    pub const fn theta2_0(&self) -> f64 {
        self.theta2_0
    }

    /// The six values in `[l1, l2, m1, m2, theta1_0, theta2_0]` order.
    #[inline]
    pub const fn values(&self) -> [f64; 6] {
        [
            self.l1,
            self.l2,
            self.m1,
            self.m2,
            self.theta1_0,
            self.theta2_0,
        ]
    }

    /// Combined reach of both links, the largest distance a bob can be from
    /// the pivot.
    #[inline]
    pub fn reach(&self) -> f64 {
        self.l1 + self.l2
    }
}

impl Default for PendulumParameters {
    /// Unit links and masses, both arms horizontal.
    fn default() -> Self {
        Self {
            l1: 1.0,
            l2: 1.0,
            m1: 1.0,
            m2: 1.0,
            theta1_0: FRAC_PI_2,
            theta2_0: FRAC_PI_2,
        }
    }
}

impl TryFrom<[f64; 6]> for PendulumParameters {
    type Error = Error;

    /// Validates values given in `[l1, l2, m1, m2, theta1_0, theta2_0]` order.
    fn try_from([l1, l2, m1, m2, theta1_0, theta2_0]: [f64; 6]) -> Result<Self> {
        Self::new(l1, l2, m1, m2, theta1_0, theta2_0)
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be a finite positive number",
        })
    }
}

fn finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

/// Span of the reference grid, in seconds.
pub const DEFAULT_SPAN: f64 = 20.0;

/// Number of samples in the reference grid.
pub const DEFAULT_SAMPLES: usize = 1000;

/// Largest grid [`TimeGrid::new`] accepts.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Evenly spaced sample times over `[0, span]`.
///
/// The first sample is exactly `0.0` and the last exactly `span`, matching
/// the usual `linspace` construction. The grid is shared for a whole session.
///
/// # Example
///
/// ```rust
/// use pendulum::TimeGrid;
///
/// let grid = TimeGrid::new(2.0, 5).unwrap();
/// assert_eq!(grid.times(), &[0.0, 0.5, 1.0, 1.5, 2.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Builds `samples` evenly spaced times from `0` to `span` inclusive.
    ///
    /// A single sample yields `[0.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGrid`] when `samples` is zero or above
    /// [`MAX_SAMPLES`], or when `span` is not a finite positive number.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(span: f64, samples: usize) -> Result<Self> {
        if samples == 0 {
            return Err(Error::InvalidGrid("at least one sample is required".into()));
        }
        if samples > MAX_SAMPLES {
            return Err(Error::InvalidGrid(format!(
                "at most {MAX_SAMPLES} samples are supported, got {samples}"
            )));
        }
        if !(span.is_finite() && span > 0.0) {
            return Err(Error::InvalidGrid(format!(
                "span must be a finite positive number, got {span}"
            )));
        }

        if samples == 1 {
            return Ok(Self { times: vec![0.0] });
        }

        let step = span / (samples - 1) as f64;
        let mut times: Vec<f64> = (0..samples).map(|i| i as f64 * step).collect();
        // Guard the endpoint against accumulated rounding.
        times[samples - 1] = span;

        Ok(Self { times })
    }

    /// Sample times in increasing order.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`; a grid holds at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Last sample time.
    #[inline]
    pub fn span(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

impl Default for TimeGrid {
    /// 1000 samples over 20 seconds.
    #[allow(clippy::cast_precision_loss)]
    fn default() -> Self {
        let step = DEFAULT_SPAN / (DEFAULT_SAMPLES - 1) as f64;
        let mut times: Vec<f64> = (0..DEFAULT_SAMPLES).map(|i| i as f64 * step).collect();
        times[DEFAULT_SAMPLES - 1] = DEFAULT_SPAN;
        Self { times }
    }
}
