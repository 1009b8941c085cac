#![allow(clippy::float_cmp)]

//! State-machine tests for the playback controller: resets on edits, error
//! retention and frame/trajectory consistency.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use pendulum::{Error, PendulumParameters, Point, TimeGrid, integrate};
use pendulum_playback::{Controller, Playback};
use proptest::prelude::*;

fn grid() -> TimeGrid {
    TimeGrid::new(4.0, 120).unwrap()
}

fn playing(params: PendulumParameters) -> Controller {
    let mut controller = Controller::new(grid());
    controller.start(params).unwrap();
    controller
}

// =============================================================================
// Parameter changes
// =============================================================================

#[test]
fn parameter_change_resets_frame_and_replaces_trajectory() {
    let mut controller = playing(PendulumParameters::default());
    for _ in 0..37 {
        controller.advance();
    }
    assert_eq!(controller.frame_index(), Some(37));
    let before = Arc::clone(controller.trajectory().unwrap());

    let next = PendulumParameters::new(1.5, 0.8, 1.2, 0.7, 1.0, 2.0).unwrap();
    controller.on_parameter_change(next).unwrap();

    assert_eq!(controller.frame_index(), Some(0));
    let after = controller.trajectory().unwrap();
    assert!(!Arc::ptr_eq(&before, after));
    assert_eq!(**after, integrate(&next, &grid()).unwrap());
    assert_eq!(controller.params(), Some(&next));
}

#[test]
fn identical_parameters_still_restart_playback() {
    let mut controller = playing(PendulumParameters::default());
    controller.advance();
    controller.advance();
    controller
        .on_parameter_change(PendulumParameters::default())
        .unwrap();
    assert_eq!(controller.frame_index(), Some(0));
}

#[test]
fn start_on_playing_controller_acts_as_parameter_change() {
    let mut controller = playing(PendulumParameters::default());
    controller.advance();
    let next = PendulumParameters::new(1.0, 1.0, 1.0, 1.0, 0.5, 0.5).unwrap();
    controller.start(next).unwrap();
    assert_eq!(controller.frame_index(), Some(0));
    assert_eq!(controller.params(), Some(&next));
}

// =============================================================================
// Failure semantics
// =============================================================================

#[test]
fn invalid_values_keep_previous_playback() {
    let mut controller = playing(PendulumParameters::default());
    for _ in 0..5 {
        controller.advance();
    }
    let before = Arc::clone(controller.trajectory().unwrap());

    let err = controller
        .on_parameter_values([-1.0, 1.0, 1.0, 1.0, 0.0, 0.0])
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameter { name: "l1", .. }));
    assert_eq!(controller.frame_index(), Some(5));
    assert!(Arc::ptr_eq(&before, controller.trajectory().unwrap()));
    assert_eq!(controller.last_error(), Some(&err));

    // Playback continues from where it was.
    assert_eq!(controller.advance(), Some(6));
}

#[test]
fn zero_mass_rejected_before_integration() {
    let mut controller = playing(PendulumParameters::default());
    assert!(controller
        .on_parameter_values([1.0, 1.0, 1.0, 0.0, 0.0, 0.0])
        .is_err());
    assert_eq!(controller.params(), Some(&PendulumParameters::default()));
}

#[test]
fn successful_change_clears_error() {
    let mut controller = playing(PendulumParameters::default());
    let _ = controller.on_parameter_values([1.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    assert!(controller.last_error().is_some());

    controller
        .on_parameter_values([1.0, 2.0, 1.0, 1.0, 0.0, 0.0])
        .unwrap();
    assert!(controller.last_error().is_none());
    assert_eq!(controller.frame_index(), Some(0));
}

#[test]
fn invalid_values_while_idle_stay_idle() {
    let mut controller = Controller::new(grid());
    assert!(controller
        .on_parameter_values([0.0, 1.0, 1.0, 1.0, 0.0, 0.0])
        .is_err());
    assert!(matches!(controller.state(), Playback::Idle));
}

// =============================================================================
// Render boundary
// =============================================================================

#[test]
fn first_frame_of_reference_configuration() {
    let controller = playing(
        PendulumParameters::new(1.0, 1.0, 1.0, 1.0, FRAC_PI_2, FRAC_PI_2).unwrap(),
    );
    let frame = controller.current_frame().unwrap();
    assert_eq!(frame.origin, Point::origin());
    assert!((frame.bob1.x - 1.0).abs() < 1e-12 && frame.bob1.y.abs() < 1e-12);
    assert!((frame.bob2.x - 2.0).abs() < 1e-12 && frame.bob2.y.abs() < 1e-12);
}

#[test]
fn current_frame_follows_trajectory() {
    let mut controller = playing(PendulumParameters::default());
    for expected in 1..10 {
        controller.advance();
        let traj = controller.trajectory().unwrap();
        assert_eq!(controller.current_frame(), traj.frame(expected));
        assert_eq!(controller.current_time(), Some(traj.times()[expected]));
    }
}

#[test]
fn playback_loops_over_full_trajectory() {
    let mut controller = playing(PendulumParameters::default());
    let len = controller.trajectory().unwrap().len();
    for _ in 0..len {
        controller.advance();
    }
    assert_eq!(controller.frame_index(), Some(0));
}

// =============================================================================
// Frame index never outlives its trajectory
// =============================================================================

#[derive(Debug, Clone)]
enum Event {
    Tick,
    Edit([f64; 6]),
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => Just(Event::Tick),
        1 => (
            -0.5f64..2.0,
            0.5f64..2.0,
            0.5f64..2.0,
            -0.5f64..2.0,
            0.0f64..3.0,
            0.0f64..3.0,
        )
            .prop_map(|(l1, l2, m1, m2, t1, t2)| Event::Edit([l1, l2, m1, m2, t1, t2])),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn frame_index_always_in_bounds(events in prop::collection::vec(event(), 1..60)) {
        let mut controller = Controller::new(TimeGrid::new(1.0, 25).unwrap());
        controller.start(PendulumParameters::default()).unwrap();

        for ev in events {
            match ev {
                Event::Tick => {
                    controller.advance();
                }
                Event::Edit(values) => {
                    let before = controller.frame_index();
                    match controller.on_parameter_values(values) {
                        Ok(()) => prop_assert_eq!(controller.frame_index(), Some(0)),
                        Err(_) => prop_assert_eq!(controller.frame_index(), before),
                    }
                }
            }
            let index = controller.frame_index().unwrap();
            let len = controller.trajectory().unwrap().len();
            prop_assert!(index < len);
            prop_assert!(controller.current_frame().is_some());
        }
    }
}
