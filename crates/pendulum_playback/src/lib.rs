#![forbid(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]

//! # Pendulum Playback
//!
//! Frame-indexed playback of a [`pendulum::Trajectory`] that reacts to
//! parameter edits by recomputing the motion and restarting at frame zero.
//!
//! The [`Controller`] is toolkit independent: a host loop calls
//! [`Controller::advance`] at the cadence given by
//! [`Controller::tick_interval`] and forwards control edits to
//! [`Controller::on_parameter_change`]. Both run on the caller's thread, one
//! at a time.
//!
//! ```rust
//! use pendulum::{PendulumParameters, TimeGrid};
//! use pendulum_playback::Controller;
//!
//! let mut controller = Controller::new(TimeGrid::new(2.0, 100).unwrap());
//! controller.start(PendulumParameters::default()).unwrap();
//!
//! controller.advance();
//! assert_eq!(controller.frame_index(), Some(1));
//!
//! let edited = PendulumParameters::new(1.5, 1.0, 1.0, 1.0, 1.0, 0.5).unwrap();
//! controller.on_parameter_change(edited).unwrap();
//! assert_eq!(controller.frame_index(), Some(0));
//! ```

mod controller;

pub use controller::{Controller, Cursor, DEFAULT_TICK_INTERVAL, Playback, PlaybackConfig};
