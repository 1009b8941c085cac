#![forbid(unsafe_code)]

//! # Pendulum Viz
//!
//! Terminal front end for the double pendulum.
//!
//! Six controls (two lengths, two masses, two initial angles) drive a
//! [`pendulum_playback::Controller`]; every edit recomputes the motion and
//! restarts the animation. The modules are split so the binary and the
//! integration tests share them:
//!
//! - [`app`] - Elm-style model: messages in, a rendered view out
//! - [`canvas`] - character raster for the linkage
//! - [`cli`] - command-line contract
//! - [`config`] - TOML configuration and CLI overrides
//! - [`controls`] - the six bounded parameter sliders
//! - [`export`] - headless CSV and JSON trajectory output
//! - [`logging`] - tracing subscriber setup
//! - [`runtime`] - terminal setup and the single-threaded event loop

pub mod app;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod controls;
pub mod export;
pub mod logging;
pub mod runtime;
