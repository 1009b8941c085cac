//! Command-line interface for `pendulum-viz`.
//!
//! # Examples
//!
//! ```bash
//! # Run the visualizer with the reference configuration
//! pendulum-viz
//!
//! # Start from a custom configuration file and a different first angle
//! pendulum-viz --config pendulum.toml --theta1 2.5
//!
//! # Write the trajectory as CSV without opening the terminal UI
//! pendulum-viz export --format csv --output motion.csv
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Double pendulum visualizer.
///
/// Integrates the two-link pendulum with an adaptive Runge-Kutta solver and
/// animates it in the terminal. Every control edit recomputes the motion and
/// restarts the animation.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "pendulum-viz",
    author,
    version,
    about = "Double pendulum visualizer with live parameter controls"
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c', env = "PENDULUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Length of the upper link (m)
    #[arg(long, allow_negative_numbers = true)]
    pub l1: Option<f64>,

    /// Length of the lower link (m)
    #[arg(long, allow_negative_numbers = true)]
    pub l2: Option<f64>,

    /// Mass of the upper bob (kg)
    #[arg(long, allow_negative_numbers = true)]
    pub m1: Option<f64>,

    /// Mass of the lower bob (kg)
    #[arg(long, allow_negative_numbers = true)]
    pub m2: Option<f64>,

    /// Initial angle of the upper link (rad, from the downward vertical)
    #[arg(long, allow_negative_numbers = true)]
    pub theta1: Option<f64>,

    /// Initial angle of the lower link (rad, from the downward vertical)
    #[arg(long, allow_negative_numbers = true)]
    pub theta2: Option<f64>,

    /// Simulated time span (s)
    #[arg(long)]
    pub t_max: Option<f64>,

    /// Number of samples over the time span
    #[arg(long)]
    pub samples: Option<usize>,

    /// Milliseconds between animation frames
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Log file (the terminal is used by the UI)
    #[arg(long, env = "PENDULUM_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (repeat for more)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Optional subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Integrate once and write the trajectory
    Export(ExportArgs),
}

/// Arguments for the export subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Output file (defaults to stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Trajectory export formats.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One row per sample with a header line
    #[default]
    Csv,
    /// A single JSON document with parameters, diagnostics and samples
    Json,
}

impl Cli {
    /// Parse from `std::env::args`.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
