//! The six parameter sliders.
//!
//! Sliders own their range; values handed to the simulation are always
//! inside it, so edits made through the UI never fail validation.

use std::f64::consts::PI;

use pendulum::PendulumParameters;

/// Increment for lengths and masses.
pub const LINEAR_STEP: f64 = 0.05;

/// Increment for angles (3 degrees).
pub const ANGLE_STEP: f64 = PI / 60.0;

/// One bounded control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    /// Label shown next to the bar.
    pub label: &'static str,
    /// Unit suffix.
    pub unit: &'static str,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Increment per key press.
    pub step: f64,
    /// Value requested at construction, before clamping.
    pub initial: f64,
    value: f64,
}

impl Slider {
    /// Creates a slider at `initial`, clamped to `[min, max]`.
    #[must_use]
    pub fn new(
        label: &'static str,
        unit: &'static str,
        min: f64,
        max: f64,
        step: f64,
        initial: f64,
    ) -> Self {
        Self {
            label,
            unit,
            min,
            max,
            step,
            initial,
            value: initial.clamp(min, max),
        }
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Sets the value, clamped to the range. Returns whether it changed.
    pub fn set(&mut self, value: f64) -> bool {
        let next = value.clamp(self.min, self.max);
        let changed = (next - self.value).abs() > f64::EPSILON;
        self.value = next;
        changed
    }

    /// Moves by `steps` increments.
    pub fn nudge(&mut self, steps: i32) -> bool {
        self.set(self.value + f64::from(steps) * self.step)
    }

    /// Whether `initial` fell outside the range and was moved onto it.
    #[must_use]
    pub fn was_clamped(&self) -> bool {
        (self.initial.clamp(self.min, self.max) - self.initial).abs() > f64::EPSILON
    }

    /// Position in the range, `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        (self.value - self.min) / (self.max - self.min)
    }

    /// A fixed-width text bar such as `[#####-----]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn bar(&self, width: usize) -> String {
        let filled = ((self.fraction() * width as f64).round() as usize).min(width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }
}

/// The slider bank with a selection cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    sliders: [Slider; 6],
    selected: usize,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(&PendulumParameters::default())
    }
}

impl Controls {
    /// Sliders initialised from `params`, clamped to their ranges.
    #[must_use]
    pub fn new(params: &PendulumParameters) -> Self {
        let [l1, l2, m1, m2, t1, t2] = params.values();
        Self {
            sliders: [
                Slider::new("Length 1", "m", 0.5, 2.0, LINEAR_STEP, l1),
                Slider::new("Length 2", "m", 0.5, 2.0, LINEAR_STEP, l2),
                Slider::new("Mass 1", "kg", 0.5, 2.0, LINEAR_STEP, m1),
                Slider::new("Mass 2", "kg", 0.5, 2.0, LINEAR_STEP, m2),
                Slider::new("Angle 1", "rad", 0.0, PI, ANGLE_STEP, t1),
                Slider::new("Angle 2", "rad", 0.0, PI, ANGLE_STEP, t2),
            ],
            selected: 0,
        }
    }

    /// All six sliders in value order.
    #[must_use]
    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    /// Index of the highlighted slider.
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// Moves the highlight down, wrapping at the end.
    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.sliders.len();
    }

    /// Moves the highlight up, wrapping at the start.
    pub fn select_prev(&mut self) {
        self.selected = (self.selected + self.sliders.len() - 1) % self.sliders.len();
    }

    /// Moves the selected slider. Returns whether its value changed.
    pub fn nudge(&mut self, steps: i32) -> bool {
        self.sliders[self.selected].nudge(steps)
    }

    /// Restores every slider to its initial value.
    pub fn reset(&mut self) {
        for slider in &mut self.sliders {
            slider.value = slider.initial.clamp(slider.min, slider.max);
        }
    }

    /// Sliders whose starting value had to be pulled into range.
    pub fn clamped(&self) -> impl Iterator<Item = &Slider> {
        self.sliders.iter().filter(|s| s.was_clamped())
    }

    /// Values in `[l1, l2, m1, m2, theta1_0, theta2_0]` order.
    #[must_use]
    pub fn values(&self) -> [f64; 6] {
        self.sliders.map(|s| s.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn default_controls_match_reference_configuration() {
        let controls = Controls::default();
        assert_eq!(controls.values(), PendulumParameters::default().values());
        assert_eq!(controls.selected(), 0);
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut controls = Controls::default();
        controls.select_prev();
        assert_eq!(controls.selected(), 5);
        controls.select_next();
        assert_eq!(controls.selected(), 0);
    }

    #[test]
    fn nudge_clamps_to_range() {
        let mut controls = Controls::default();
        for _ in 0..100 {
            controls.nudge(1);
        }
        assert_eq!(controls.values()[0], 2.0);
        assert!(!controls.nudge(1));
        for _ in 0..100 {
            controls.nudge(-1);
        }
        assert_eq!(controls.values()[0], 0.5);
    }

    #[test]
    fn angle_slider_uses_angle_step() {
        let mut controls = Controls::default();
        for _ in 0..4 {
            controls.select_next();
        }
        assert!(controls.nudge(-1));
        assert!((controls.values()[4] - (FRAC_PI_2 - ANGLE_STEP)).abs() < 1e-12);
    }

    #[test]
    fn reset_restores_initial_values() {
        let mut controls = Controls::default();
        controls.nudge(3);
        controls.select_next();
        controls.nudge(-2);
        controls.reset();
        assert_eq!(controls.values(), Controls::default().values());
    }

    #[test]
    fn out_of_range_params_are_clamped() {
        let params = PendulumParameters::new(5.0, 0.1, 1.0, 1.0, -1.0, 4.0).unwrap();
        let values = Controls::new(&params).values();
        assert_eq!(values[0], 2.0);
        assert_eq!(values[1], 0.5);
        assert_eq!(values[4], 0.0);
        assert_eq!(values[5], PI);
    }

    #[test]
    fn clamped_sliders_are_reported() {
        let params = PendulumParameters::new(5.0, 1.0, 1.0, 1.0, 1.0, 4.0).unwrap();
        let controls = Controls::new(&params);
        let labels: Vec<_> = controls.clamped().map(|s| s.label).collect();
        assert_eq!(labels, ["Length 1", "Angle 2"]);

        let first = controls.clamped().next().unwrap();
        assert_eq!(first.initial, 5.0);
        assert_eq!(first.value(), 2.0);

        assert_eq!(Controls::default().clamped().count(), 0);
    }

    #[test]
    fn slider_values_always_form_valid_parameters() {
        let mut controls = Controls::default();
        for i in 0..6 {
            for _ in 0..200 {
                controls.nudge(-1);
            }
            assert!(PendulumParameters::try_from(controls.values()).is_ok(), "slider {i}");
            controls.select_next();
        }
    }

    #[test]
    fn bar_reflects_fraction() {
        let slider = Slider::new("x", "", 0.0, 1.0, 0.1, 0.5);
        assert_eq!(slider.bar(10), "[#####-----]");
        assert_eq!(Slider::new("x", "", 0.0, 1.0, 0.1, 1.0).bar(4), "[####]");
    }
}
