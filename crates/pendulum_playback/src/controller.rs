//! The playback state machine.
//!
//! ```text
//! Idle ──start(p)──────────────────────────▶ Playing(0, integrate(p))
//! Playing(i, T) ──advance()────────────────▶ Playing((i + 1) mod |T|, T)
//! Playing(i, T) ──on_parameter_change(p)──▶ Playing(0, integrate(p))
//! Playing(i, T) ──on_parameter_values(bad)─▶ Playing(i, T), error kept
//! ```
//!
//! Recomputation happens synchronously inside `on_parameter_change` and is
//! traced as the `recompute` span.

use std::sync::Arc;
use std::time::Duration;

use pendulum::{Frame, PendulumParameters, SolverOptions, TimeGrid, Trajectory};

/// Wall-clock time between frames.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(30);

/// Playback cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Time between two [`Controller::advance`] calls.
    pub tick_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// A frame index together with the trajectory it indexes.
///
/// The two are only ever replaced together, so `frame < trajectory.len()`
/// holds for every cursor a reader can observe.
#[derive(Debug, Clone)]
pub struct Cursor {
    frame: usize,
    trajectory: Arc<Trajectory>,
}

impl Cursor {
    fn rewound(trajectory: Trajectory) -> Self {
        Self {
            frame: 0,
            trajectory: Arc::new(trajectory),
        }
    }

    /// Current frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The trajectory being played.
    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.trajectory
    }

    /// Positions at the current frame.
    pub fn positions(&self) -> Option<Frame> {
        self.trajectory.frame(self.frame)
    }
}

/// Observable playback state.
#[derive(Debug, Clone, Default)]
pub enum Playback {
    /// No trajectory has been computed yet.
    #[default]
    Idle,
    /// A trajectory is looping.
    Playing(Cursor),
}

/// Owns the live trajectory and the frame being shown.
#[derive(Debug)]
pub struct Controller {
    grid: TimeGrid,
    options: SolverOptions,
    config: PlaybackConfig,
    playback: Playback,
    last_error: Option<pendulum::Error>,
}

impl Controller {
    /// Creates an idle controller sampling motion on `grid` with default
    /// solver tolerances.
    pub fn new(grid: TimeGrid) -> Self {
        Self::with_options(grid, SolverOptions::default())
    }

    /// Creates an idle controller with explicit solver options.
    pub fn with_options(grid: TimeGrid, options: SolverOptions) -> Self {
        Self {
            grid,
            options,
            config: PlaybackConfig::default(),
            playback: Playback::Idle,
            last_error: None,
        }
    }

    /// Sets the playback cadence.
    #[must_use]
    pub fn with_config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    /// Computes the first trajectory and begins playback at frame 0.
    ///
    /// On a controller that is already playing this is the same as
    /// [`on_parameter_change`](Self::on_parameter_change).
    ///
    /// # Errors
    ///
    /// Propagates integration failures; the controller stays in its previous
    /// state.
    pub fn start(&mut self, params: PendulumParameters) -> pendulum::Result<()> {
        self.on_parameter_change(params)
    }

    /// Advances one frame, wrapping to 0 after the last one.
    ///
    /// Returns the new frame index, or `None` while idle.
    pub fn advance(&mut self) -> Option<usize> {
        match &mut self.playback {
            Playback::Idle => None,
            Playback::Playing(cursor) => {
                let len = cursor.trajectory.len();
                cursor.frame = if cursor.frame + 1 >= len {
                    0
                } else {
                    cursor.frame + 1
                };
                Some(cursor.frame)
            }
        }
    }

    /// Recomputes the motion for `params` and restarts playback at frame 0.
    ///
    /// The old trajectory and frame index are discarded in one assignment.
    ///
    /// # Errors
    ///
    /// If integration fails the current playback is left untouched, and the
    /// error is both returned and kept for [`last_error`](Self::last_error).
    pub fn on_parameter_change(&mut self, params: PendulumParameters) -> pendulum::Result<()> {
        let span = tracing::info_span!(
            "recompute",
            l1 = params.l1(),
            l2 = params.l2(),
            m1 = params.m1(),
            m2 = params.m2(),
            theta1 = params.theta1_0(),
            theta2 = params.theta2_0(),
        );
        let _guard = span.enter();

        match pendulum::integrate_with(&params, &self.grid, &self.options) {
            Ok(trajectory) => {
                tracing::info!(
                    frames = trajectory.len(),
                    steps = trajectory.diagnostics().accepted_steps,
                    "trajectory replaced"
                );
                self.playback = Playback::Playing(Cursor::rewound(trajectory));
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "parameter change rejected, keeping previous trajectory"
                );
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Validates raw control values, given in
    /// `[l1, l2, m1, m2, theta1_0, theta2_0]` order, then behaves like
    /// [`on_parameter_change`](Self::on_parameter_change).
    ///
    /// # Errors
    ///
    /// Returns [`pendulum::Error::InvalidParameter`] for a non-positive length
    /// or mass without touching playback, and integration failures as above.
    pub fn on_parameter_values(&mut self, values: [f64; 6]) -> pendulum::Result<()> {
        match PendulumParameters::try_from(values) {
            Ok(params) => self.on_parameter_change(params),
            Err(err) => {
                tracing::warn!(error = %err, "invalid parameter values rejected");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Current playback state.
    pub fn state(&self) -> &Playback {
        &self.playback
    }

    /// Whether a trajectory is being played.
    pub fn is_playing(&self) -> bool {
        matches!(self.playback, Playback::Playing(_))
    }

    /// Current frame index, `None` while idle.
    pub fn frame_index(&self) -> Option<usize> {
        match &self.playback {
            Playback::Idle => None,
            Playback::Playing(cursor) => Some(cursor.frame),
        }
    }

    /// The live trajectory, `None` while idle.
    pub fn trajectory(&self) -> Option<&Arc<Trajectory>> {
        match &self.playback {
            Playback::Idle => None,
            Playback::Playing(cursor) => Some(&cursor.trajectory),
        }
    }

    /// Parameters of the live trajectory.
    pub fn params(&self) -> Option<&PendulumParameters> {
        self.trajectory().map(|t| t.params())
    }

    /// Pivot and bob positions to draw for the current frame.
    pub fn current_frame(&self) -> Option<Frame> {
        match &self.playback {
            Playback::Idle => None,
            Playback::Playing(cursor) => cursor.positions(),
        }
    }

    /// Simulation time of the current frame.
    pub fn current_time(&self) -> Option<f64> {
        match &self.playback {
            Playback::Idle => None,
            Playback::Playing(cursor) => cursor.trajectory.times().get(cursor.frame).copied(),
        }
    }

    /// The most recent rejected parameter change, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<&pendulum::Error> {
        self.last_error.as_ref()
    }

    /// Time between frames.
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }

    /// The sampling grid shared by every trajectory this controller builds.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }
}
