//! Elm-style application model.
//!
//! [`App::update`] consumes one [`Msg`] at a time and [`App::view`] renders
//! the whole screen as a string. Neither touches the terminal, so the model
//! can be driven directly from tests.

use std::fmt::Write as _;

use pendulum::total_energy;
use pendulum_playback::{Controller, PlaybackConfig};

use crate::canvas::Canvas;
use crate::config::{Config, ConfigError};
use crate::controls::Controls;

/// Keys the app reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Esc,
    CtrlC,
    /// Any printable character.
    Char(char),
}

/// Input to [`App::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    /// The playback timer fired.
    Tick,
    /// A key was pressed.
    Key(Key),
    /// The terminal was resized.
    Resize { width: u16, height: u16 },
    /// Stop the program.
    Quit,
}

/// Rows below the canvas: status, six sliders and the help line.
const CHROME_ROWS: usize = 8;
const BAR_WIDTH: usize = 20;

/// The running visualizer.
#[derive(Debug)]
pub struct App {
    controller: Controller,
    controls: Controls,
    width: u16,
    height: u16,
    quitting: bool,
}

impl App {
    /// Builds the app and computes the first trajectory.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration values or when the first
    /// integration fails.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let controls = Controls::new(&config.params()?);
        for slider in controls.clamped() {
            tracing::warn!(
                slider = slider.label,
                configured = slider.initial,
                used = slider.value(),
                "configured value outside slider range, clamped"
            );
        }
        let mut controller = Controller::with_options(config.grid()?, config.solver_options())
            .with_config(PlaybackConfig {
                tick_interval: config.tick_interval(),
            });
        controller.on_parameter_values(controls.values())?;

        Ok(Self {
            controller,
            controls,
            width: 80,
            height: 24,
            quitting: false,
        })
    }

    /// The playback controller.
    #[must_use]
    pub const fn controller(&self) -> &Controller {
        &self.controller
    }

    /// The slider bank.
    #[must_use]
    pub const fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Whether a quit was requested.
    #[must_use]
    pub const fn quitting(&self) -> bool {
        self.quitting
    }

    /// Applies one message.
    pub fn update(&mut self, msg: Msg) {
        match msg {
            Msg::Tick => {
                self.controller.advance();
            }
            Msg::Resize { width, height } => {
                self.width = width;
                self.height = height;
            }
            Msg::Quit => self.quitting = true,
            Msg::Key(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: Key) {
        match key {
            Key::Esc | Key::CtrlC | Key::Char('q') => self.quitting = true,
            Key::Up | Key::Char('k') => self.controls.select_prev(),
            Key::Down | Key::Char('j') => self.controls.select_next(),
            Key::Left | Key::Char('h') => self.edit(-1),
            Key::Right | Key::Char('l') => self.edit(1),
            Key::Char('r') => {
                self.controls.reset();
                self.recompute();
            }
            Key::Char(_) => {}
        }
    }

    fn edit(&mut self, steps: i32) {
        if self.controls.nudge(steps) {
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        // A rejected change stays in `last_error` and shows on the status line.
        let _ = self.controller.on_parameter_values(self.controls.values());
    }

    /// Canvas size in cells for the current terminal size.
    #[must_use]
    pub fn canvas_size(&self) -> (usize, usize) {
        let rows = usize::from(self.height).saturating_sub(CHROME_ROWS).max(5);
        let cols = usize::from(self.width).min(2 * rows + 1).max(1);
        (cols, rows)
    }

    /// The status line: time, frame, energy and the last error if any.
    #[must_use]
    pub fn status_line(&self) -> String {
        let mut line = String::new();
        if let (Some(index), Some(traj)) =
            (self.controller.frame_index(), self.controller.trajectory())
        {
            let time = traj.times()[index];
            let energy = total_energy(traj.params(), &traj.states()[index]);
            let _ = write!(
                line,
                "t = {time:6.2} s  frame {:>4}/{}  E = {energy:+.4} J",
                index + 1,
                traj.len()
            );
        } else {
            line.push_str("idle");
        }
        if let Some(err) = self.controller.last_error() {
            let _ = write!(line, "  error: {err}");
        }
        line
    }

    /// Renders the full screen, rows separated by `\n`.
    #[must_use]
    pub fn view(&self) -> String {
        let (cols, rows) = self.canvas_size();
        let mut canvas = Canvas::new(cols, rows);
        if let Some(frame) = self.controller.current_frame() {
            canvas.draw_frame(&frame);
        }

        let mut out = canvas.render();
        out.push('\n');
        out.push_str(&self.status_line());
        for (i, slider) in self.controls.sliders().iter().enumerate() {
            let marker = if i == self.controls.selected() { '>' } else { ' ' };
            let _ = write!(
                out,
                "\n{marker} {:<8} {} {:5.2} {}",
                slider.label,
                slider.bar(BAR_WIDTH),
                slider.value(),
                slider.unit
            );
        }
        out.push_str("\n↑/↓ select  ←/→ adjust  r reset  q quit");
        out
    }
}
