//! Runtime configuration for `pendulum-viz`.
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! TOML file, then command-line flags. Every section may be omitted from the
//! file.
//!
//! ```toml
//! [pendulum]
//! l1 = 1.2
//! theta1 = 2.0
//!
//! [simulation]
//! t_max = 30.0
//! samples = 1500
//!
//! [playback]
//! tick_ms = 16
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use pendulum::{PendulumParameters, SolverOptions, TimeGrid};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// All runtime options, independent of where they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Initial physical parameters.
    pub pendulum: PendulumSection,
    /// Sampling grid and solver tolerances.
    pub simulation: SimulationSection,
    /// Animation cadence.
    pub playback: PlaybackSection,
    /// Log destination and verbosity.
    pub logging: LoggingSection,
}

/// `[pendulum]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PendulumSection {
    /// Upper link length (m).
    pub l1: f64,
    /// Lower link length (m).
    pub l2: f64,
    /// Upper bob mass (kg).
    pub m1: f64,
    /// Lower bob mass (kg).
    pub m2: f64,
    /// Initial upper angle from the downward vertical (rad).
    pub theta1: f64,
    /// Initial lower angle (rad).
    pub theta2: f64,
}

impl Default for PendulumSection {
    fn default() -> Self {
        let [l1, l2, m1, m2, theta1, theta2] = PendulumParameters::default().values();
        Self {
            l1,
            l2,
            m1,
            m2,
            theta1,
            theta2,
        }
    }
}

/// `[simulation]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Simulated time span in seconds.
    pub t_max: f64,
    /// Samples over the span, endpoints included.
    pub samples: usize,
    /// Relative error tolerance.
    pub rtol: f64,
    /// Absolute error tolerance.
    pub atol: f64,
    /// Step budget for one integration.
    pub max_steps: usize,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let options = SolverOptions::default();
        Self {
            t_max: pendulum::DEFAULT_SPAN,
            samples: pendulum::DEFAULT_SAMPLES,
            rtol: options.rtol,
            atol: options.atol,
            max_steps: options.max_steps,
        }
    }
}

/// `[playback]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaybackSection {
    /// Milliseconds between frames.
    pub tick_ms: u64,
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self {
            tick_ms: 30,
        }
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Log file; defaults to `pendulum-viz.log` in the temp directory.
    pub file: Option<PathBuf>,
    /// Verbosity level, 0 = warn through 3 = trace.
    pub verbosity: u8,
}

impl Config {
    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid configuration TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolves the full configuration for a command line: defaults, then
    /// the `--config` file if given, then individual flags.
    ///
    /// # Errors
    ///
    /// Propagates [`load`](Self::load) and [`validate`](Self::validate)
    /// failures.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields with any flags present on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        let p = &mut self.pendulum;
        for (slot, flag) in [
            (&mut p.l1, cli.l1),
            (&mut p.l2, cli.l2),
            (&mut p.m1, cli.m1),
            (&mut p.m2, cli.m2),
            (&mut p.theta1, cli.theta1),
            (&mut p.theta2, cli.theta2),
            (&mut self.simulation.t_max, cli.t_max),
        ] {
            if let Some(value) = flag {
                *slot = value;
            }
        }
        if let Some(samples) = cli.samples {
            self.simulation.samples = samples;
        }
        if let Some(tick_ms) = cli.tick_ms {
            self.playback.tick_ms = tick_ms;
        }
        if let Some(ref file) = cli.log_file {
            self.logging.file = Some(file.clone());
        }
        if cli.verbose > 0 {
            self.logging.verbosity = cli.verbose;
        }
    }

    /// Checks that every value can be turned into its domain type.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params()?;
        self.grid()?;
        self.solver_options().validate()?;
        if self.playback.tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "playback.tick_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Initial parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pendulum`] for a non-positive length or mass.
    pub fn params(&self) -> Result<PendulumParameters, ConfigError> {
        let p = &self.pendulum;
        Ok(PendulumParameters::new(
            p.l1, p.l2, p.m1, p.m2, p.theta1, p.theta2,
        )?)
    }

    /// Sampling grid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pendulum`] for a zero sample count or a
    /// non-positive span.
    pub fn grid(&self) -> Result<TimeGrid, ConfigError> {
        Ok(TimeGrid::new(self.simulation.t_max, self.simulation.samples)?)
    }

    /// Solver tolerances and step budget.
    #[must_use]
    pub const fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            rtol: self.simulation.rtol,
            atol: self.simulation.atol,
            max_steps: self.simulation.max_steps,
        }
    }

    /// Wall-clock time between frames.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.playback.tick_ms)
    }

    /// Where log output goes.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("pendulum-viz.log"))
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The file is not valid configuration TOML.
    #[error("invalid config file: {0}")]
    Parse(String),

    /// A value was rejected by the simulation.
    #[error(transparent)]
    Pendulum(#[from] pendulum::Error),

    /// A value outside the simulation crate was rejected.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["pendulum-viz"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn config_default_matches_reference_configuration() {
        let config = Config::default();
        assert_eq!(config.params().unwrap(), PendulumParameters::default());
        assert_eq!(config.grid().unwrap(), TimeGrid::default());
        assert_eq!(config.solver_options(), SolverOptions::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str(
            "[pendulum]\nl1 = 1.5\n\n[playback]\ntick_ms = 16\n",
        )
        .unwrap();
        assert_eq!(config.pendulum.l1, 1.5);
        assert_eq!(config.pendulum.l2, 1.0);
        assert_eq!(config.playback.tick_ms, 16);
        assert_eq!(config.simulation, SimulationSection::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[pendulum]\nlength = 2.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let mut config = Config::from_toml_str("[pendulum]\nl1 = 1.5\ntheta1 = 0.5\n").unwrap();
        config.apply_cli(&cli(&["--l1", "0.75", "--samples", "200", "-vv"]));
        assert_eq!(config.pendulum.l1, 0.75);
        assert_eq!(config.pendulum.theta1, 0.5);
        assert_eq!(config.simulation.samples, 200);
        assert_eq!(config.logging.verbosity, 2);
    }

    #[test]
    fn validate_rejects_zero_mass() {
        let mut config = Config::default();
        config.pendulum.m2 = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Pendulum(pendulum::Error::InvalidParameter {
                name: "m2",
                ..
            }))
        ));
    }

    #[test]
    fn validate_rejects_zero_samples_and_tick() {
        let mut config = Config::default();
        config.simulation.samples = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.playback.tick_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_oversized_sample_count() {
        let mut config = Config::default();
        config.simulation.samples = usize::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Pendulum(pendulum::Error::InvalidGrid(_)))
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\nt_max = 5.0\nsamples = 50").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.grid().unwrap().len(), 50);
        assert_eq!(config.grid().unwrap().span(), 5.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn resolve_applies_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pendulum]\nm1 = 2.0\nm2 = 3.0").unwrap();
        let path = file.path().to_str().unwrap().to_owned();
        let config = Config::resolve(&cli(&["--config", &path, "--m2", "0.5"])).unwrap();
        assert_eq!(config.pendulum.m1, 2.0);
        assert_eq!(config.pendulum.m2, 0.5);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = Config::default();
        config.logging.file = Some(PathBuf::from("/tmp/p.log"));
        let text = toml::to_string(&config).unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }
}
