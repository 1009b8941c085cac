//! Headless trajectory output.

use std::io::Write;

use pendulum::{Diagnostics, PendulumParameters, Point, State, Trajectory};
use serde::Serialize;

use crate::cli::ExportFormat;

/// CSV column names, in row order.
pub const CSV_HEADER: &str = "t,theta1,omega1,theta2,omega2,x1,y1,x2,y2";

#[derive(Serialize)]
struct Sample<'a> {
    t: f64,
    #[serde(flatten)]
    state: &'a State,
    bob1: Point,
    bob2: Point,
}

#[derive(Serialize)]
struct Document<'a> {
    params: &'a PendulumParameters,
    diagnostics: &'a Diagnostics,
    samples: Vec<Sample<'a>>,
}

fn samples(trajectory: &Trajectory) -> impl Iterator<Item = Sample<'_>> {
    trajectory
        .times()
        .iter()
        .zip(trajectory.states())
        .zip(trajectory.frames())
        .map(|((&t, state), frame)| Sample {
            t,
            state,
            bob1: frame.bob1,
            bob2: frame.bob2,
        })
}

/// Writes `trajectory` to `out` in `format`.
///
/// # Errors
///
/// Returns I/O failures from `out` and serialization failures.
pub fn write<W: Write>(
    trajectory: &Trajectory,
    format: ExportFormat,
    mut out: W,
) -> anyhow::Result<()> {
    match format {
        ExportFormat::Csv => {
            writeln!(out, "{CSV_HEADER}")?;
            for s in samples(trajectory) {
                writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{}",
                    s.t,
                    s.state.theta1,
                    s.state.omega1,
                    s.state.theta2,
                    s.state.omega2,
                    s.bob1.x,
                    s.bob1.y,
                    s.bob2.x,
                    s.bob2.y
                )?;
            }
        }
        ExportFormat::Json => {
            let doc = Document {
                params: trajectory.params(),
                diagnostics: trajectory.diagnostics(),
                samples: samples(trajectory).collect(),
            };
            serde_json::to_writer_pretty(&mut out, &doc)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
