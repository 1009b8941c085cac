#![forbid(unsafe_code)]

//! `pendulum-viz` binary.
//!
//! ```bash
//! cargo run -p pendulum_viz
//! cargo run -p pendulum_viz -- export --format json
//! ```

use std::fs::File;
use std::io::{self, BufWriter};

use anyhow::Context;

use pendulum_viz::app::App;
use pendulum_viz::cli::{Cli, Command, ExportArgs};
use pendulum_viz::config::Config;
use pendulum_viz::{export, logging, runtime};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let config = Config::resolve(&cli).context("invalid configuration")?;

    logging::init(&config.log_file(), config.logging.verbosity)?;

    match cli.command {
        Some(Command::Export(args)) => run_export(&config, &args),
        None => run_tui(&config),
    }
}

fn run_tui(config: &Config) -> anyhow::Result<()> {
    let app = App::from_config(config).context("failed to compute the initial trajectory")?;
    runtime::run(app).context("terminal error")?;
    Ok(())
}

fn run_export(config: &Config, args: &ExportArgs) -> anyhow::Result<()> {
    let params = config.params()?;
    let trajectory = pendulum::integrate_with(&params, &config.grid()?, &config.solver_options())
        .context("integration failed")?;

    tracing::info!(
        samples = trajectory.len(),
        format = ?args.format,
        "exporting trajectory"
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            export::write(&trajectory, args.format, BufWriter::new(file))
        }
        None => export::write(&trajectory, args.format, io::stdout().lock()),
    }
}
