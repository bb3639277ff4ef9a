//! Interaction Tests
//!
//! Tests for:
//! - Mouse: click versus drag tolerance, hover, wheel zoom
//! - Touch: single-finger drag and tap, pinch zoom, lifting fingers
//! - Touch cancellation: never a click
//! - Auto-rotate suspension and resume scheduling
//! - Window to NDC conversion

use glam::Vec2;
use smallvec::smallvec;

use fete::animation::orbit::AUTO_ROTATE_RESUME_MS;
use fete::app::input::{PointerTracker, TouchPhase};
use fete::interaction::{
    CLICK_TOLERANCE_PX, Gesture, InteractionController, InteractionState, PINCH_ZOOM_SPEED,
    PointerEvent, PointerKind, WHEEL_ZOOM_SPEED, screen_to_ndc,
};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn at(time_ms: f64, kind: PointerKind) -> PointerEvent {
    PointerEvent::new(time_ms, kind)
}

fn clicks(gestures: &[Gesture]) -> Vec<Vec2> {
    gestures
        .iter()
        .filter_map(|g| match g {
            Gesture::Click(p) => Some(*p),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Mouse
// ============================================================================

#[test]
fn press_suspends_auto_rotate() {
    let mut controller = InteractionController::new();
    let gestures = controller.handle(&at(0.0, PointerKind::Down(Vec2::new(10.0, 10.0))));
    assert_eq!(gestures.as_slice(), &[Gesture::SuspendAutoRotate]);
    assert!(matches!(
        controller.state(),
        InteractionState::Dragging { travelled, .. } if travelled == 0.0
    ));
}

#[test]
fn release_in_place_is_a_click() {
    let mut controller = InteractionController::new();
    let p = Vec2::new(200.0, 150.0);
    controller.handle(&at(0.0, PointerKind::Down(p)));
    let gestures = controller.handle(&at(120.0, PointerKind::Up(p)));

    assert_eq!(clicks(&gestures), vec![p]);
    assert!(gestures.contains(&Gesture::ResumeAutoRotateAt(120.0 + AUTO_ROTATE_RESUME_MS)));
    assert_eq!(controller.state(), InteractionState::Idle);
}

#[test]
fn small_jitter_still_clicks() {
    let mut controller = InteractionController::new();
    controller.handle(&at(0.0, PointerKind::Down(Vec2::new(100.0, 100.0))));
    controller.handle(&at(10.0, PointerKind::Move(Vec2::new(101.0, 101.0))));
    let gestures = controller.handle(&at(20.0, PointerKind::Up(Vec2::new(102.0, 100.0))));
    assert_eq!(clicks(&gestures).len(), 1);
}

#[test]
fn drag_beyond_tolerance_is_not_a_click() {
    let mut controller = InteractionController::new();
    let start = Vec2::new(100.0, 100.0);
    controller.handle(&at(0.0, PointerKind::Down(start)));
    let moved = controller.handle(&at(
        10.0,
        PointerKind::Move(start + Vec2::new(CLICK_TOLERANCE_PX + 6.0, 0.0)),
    ));
    assert_eq!(
        moved.as_slice(),
        &[Gesture::Rotate {
            dx: CLICK_TOLERANCE_PX + 6.0,
            dy: 0.0
        }]
    );

    // Coming back to the start does not turn the drag into a click.
    let gestures = controller.handle(&at(20.0, PointerKind::Up(start)));
    assert!(clicks(&gestures).is_empty());
    assert!(gestures.contains(&Gesture::ResumeAutoRotateAt(20.0 + AUTO_ROTATE_RESUME_MS)));
}

#[test]
fn drag_reports_incremental_deltas() {
    let mut controller = InteractionController::new();
    controller.handle(&at(0.0, PointerKind::Down(Vec2::ZERO)));
    controller.handle(&at(1.0, PointerKind::Move(Vec2::new(10.0, 5.0))));
    let gestures = controller.handle(&at(2.0, PointerKind::Move(Vec2::new(12.0, 2.0))));
    assert_eq!(gestures.as_slice(), &[Gesture::Rotate { dx: 2.0, dy: -3.0 }]);
}

#[test]
fn moving_without_a_button_hovers() {
    let mut controller = InteractionController::new();
    let p = Vec2::new(5.0, 6.0);
    let gestures = controller.handle(&at(0.0, PointerKind::Move(p)));
    assert_eq!(gestures.as_slice(), &[Gesture::Hover(p)]);
    assert_eq!(controller.state(), InteractionState::Idle);
}

#[test]
fn stray_release_does_nothing() {
    let mut controller = InteractionController::new();
    let gestures = controller.handle(&at(0.0, PointerKind::Up(Vec2::ZERO)));
    assert!(gestures.is_empty());
}

#[test]
fn wheel_zooms_away_on_positive_delta() {
    let mut controller = InteractionController::new();
    let gestures = controller.handle(&at(0.0, PointerKind::Wheel(100.0)));
    let [Gesture::Zoom(delta)] = gestures.as_slice() else {
        panic!("expected one zoom, got {gestures:?}");
    };
    assert!(approx(*delta, 100.0 * WHEEL_ZOOM_SPEED));
}

// ============================================================================
// Touch
// ============================================================================

#[test]
fn single_touch_tap_is_a_click() {
    let mut controller = InteractionController::new();
    let p = Vec2::new(40.0, 80.0);
    controller.handle(&at(0.0, PointerKind::TouchStart(smallvec![p])));
    let gestures = controller.handle(&at(
        90.0,
        PointerKind::TouchEnd {
            position: p,
            remaining: smallvec![],
        },
    ));
    assert_eq!(clicks(&gestures), vec![p]);
}

#[test]
fn single_touch_drag_rotates() {
    let mut controller = InteractionController::new();
    controller.handle(&at(0.0, PointerKind::TouchStart(smallvec![Vec2::ZERO])));
    let gestures = controller.handle(&at(
        16.0,
        PointerKind::TouchMove(smallvec![Vec2::new(-8.0, 3.0)]),
    ));
    assert_eq!(gestures.as_slice(), &[Gesture::Rotate { dx: -8.0, dy: 3.0 }]);
}

#[test]
fn pinch_zooms_by_change_in_spread() {
    let mut controller = InteractionController::new();
    let a = Vec2::new(100.0, 100.0);
    controller.handle(&at(0.0, PointerKind::TouchStart(smallvec![a])));
    let started = controller.handle(&at(
        5.0,
        PointerKind::TouchStart(smallvec![a, Vec2::new(200.0, 100.0)]),
    ));
    assert_eq!(started.as_slice(), &[Gesture::SuspendAutoRotate]);
    assert!(matches!(
        controller.state(),
        InteractionState::Pinching { distance } if approx(distance, 100.0)
    ));

    // Spreading the fingers moves the camera closer.
    let spread = controller.handle(&at(
        10.0,
        PointerKind::TouchMove(smallvec![a, Vec2::new(250.0, 100.0)]),
    ));
    let [Gesture::Zoom(delta)] = spread.as_slice() else {
        panic!("expected one zoom, got {spread:?}");
    };
    assert!(approx(*delta, -50.0 * PINCH_ZOOM_SPEED));

    // Deltas are measured from the previous move, not from the start.
    let pinch = controller.handle(&at(
        15.0,
        PointerKind::TouchMove(smallvec![a, Vec2::new(230.0, 100.0)]),
    ));
    let [Gesture::Zoom(delta)] = pinch.as_slice() else {
        panic!("expected one zoom, got {pinch:?}");
    };
    assert!(approx(*delta, 20.0 * PINCH_ZOOM_SPEED));
}

#[test]
fn lifting_one_pinch_finger_never_clicks() {
    let mut controller = InteractionController::new();
    let a = Vec2::new(100.0, 100.0);
    let b = Vec2::new(200.0, 100.0);
    controller.handle(&at(0.0, PointerKind::TouchStart(smallvec![a, b])));

    let lifted = controller.handle(&at(
        10.0,
        PointerKind::TouchEnd {
            position: b,
            remaining: smallvec![a],
        },
    ));
    assert!(lifted.is_empty());

    let gestures = controller.handle(&at(
        20.0,
        PointerKind::TouchEnd {
            position: a,
            remaining: smallvec![],
        },
    ));
    assert!(clicks(&gestures).is_empty());
    assert!(gestures.contains(&Gesture::ResumeAutoRotateAt(20.0 + AUTO_ROTATE_RESUME_MS)));
    assert_eq!(controller.state(), InteractionState::Idle);
}

#[test]
fn pinch_release_schedules_resume() {
    let mut controller = InteractionController::new();
    controller.handle(&at(
        0.0,
        PointerKind::TouchStart(smallvec![Vec2::ZERO, Vec2::new(50.0, 0.0)]),
    ));
    let gestures = controller.handle(&at(
        500.0,
        PointerKind::TouchEnd {
            position: Vec2::ZERO,
            remaining: smallvec![],
        },
    ));
    assert_eq!(
        gestures.as_slice(),
        &[Gesture::ResumeAutoRotateAt(500.0 + AUTO_ROTATE_RESUME_MS)]
    );
}

#[test]
fn cancelled_touch_is_not_a_tap() {
    let mut tracker = PointerTracker::new();
    let mut controller = InteractionController::new();
    let p = Vec2::new(100.0, 100.0);

    let start = tracker.touch(TouchPhase::Started, 1, p, 0.0).unwrap();
    controller.handle(&start);
    let cancel = tracker.touch(TouchPhase::Cancelled, 1, p, 50.0).unwrap();
    let gestures = controller.handle(&cancel);

    assert!(clicks(&gestures).is_empty(), "{gestures:?}");
    assert_eq!(
        gestures.as_slice(),
        &[Gesture::ResumeAutoRotateAt(50.0 + AUTO_ROTATE_RESUME_MS)]
    );
    assert_eq!(controller.state(), InteractionState::Idle);
}

#[test]
fn cancelling_one_pinch_finger_leaves_an_untappable_drag() {
    let mut controller = InteractionController::new();
    let a = Vec2::new(100.0, 100.0);
    let b = Vec2::new(200.0, 100.0);
    controller.handle(&at(0.0, PointerKind::TouchStart(smallvec![a, b])));

    let cancelled = controller.handle(&at(
        10.0,
        PointerKind::TouchCancel {
            remaining: smallvec![a],
        },
    ));
    assert!(cancelled.is_empty());

    let gestures = controller.handle(&at(
        20.0,
        PointerKind::TouchEnd {
            position: a,
            remaining: smallvec![],
        },
    ));
    assert!(clicks(&gestures).is_empty());
}

#[test]
fn cancel_without_a_gesture_does_nothing() {
    let mut controller = InteractionController::new();
    let gestures = controller.handle(&at(
        0.0,
        PointerKind::TouchCancel {
            remaining: smallvec![],
        },
    ));
    assert!(gestures.is_empty());
}

// ============================================================================
// Coordinates
// ============================================================================

#[test]
fn ndc_maps_corners_and_center() {
    let size = (800, 600);
    let center = screen_to_ndc(Vec2::new(400.0, 300.0), size.0, size.1).unwrap();
    assert!(approx(center.x, 0.0) && approx(center.y, 0.0));

    let top_left = screen_to_ndc(Vec2::ZERO, size.0, size.1).unwrap();
    assert!(approx(top_left.x, -1.0) && approx(top_left.y, 1.0));

    let bottom_right = screen_to_ndc(Vec2::new(800.0, 600.0), size.0, size.1).unwrap();
    assert!(approx(bottom_right.x, 1.0) && approx(bottom_right.y, -1.0));
}

#[test]
fn ndc_rejects_empty_viewports() {
    assert!(screen_to_ndc(Vec2::ZERO, 0, 600).is_none());
    assert!(screen_to_ndc(Vec2::ZERO, 800, 0).is_none());
}
