//! Winit input adapter
//!
//! Translates winit window events into the crate's platform-neutral
//! [`AppEvent`]s.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::app::input::{PointerTracker, TouchPhase};
use crate::app::router::{AppEvent, Key};

/// Pixels per wheel line, matching a typical browser line height.
const LINE_HEIGHT_PX: f32 = 100.0;

#[must_use]
pub fn translate_key(physical_key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };
    match code {
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::Space => Some(Key::Space),
        _ => None,
    }
}

#[must_use]
pub fn translate_touch_phase(phase: winit::event::TouchPhase) -> TouchPhase {
    match phase {
        winit::event::TouchPhase::Started => TouchPhase::Started,
        winit::event::TouchPhase::Moved => TouchPhase::Moved,
        winit::event::TouchPhase::Ended => TouchPhase::Ended,
        winit::event::TouchPhase::Cancelled => TouchPhase::Cancelled,
    }
}

/// Winit reports scrolling "towards the user" as positive y; the
/// controller expects positive values to zoom out.
#[must_use]
pub fn wheel_delta_px(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

/// Translates one window event. Events the party does not use map to `None`.
pub fn process_window_event(
    tracker: &mut PointerTracker,
    event: &WindowEvent,
    time_ms: f64,
) -> Option<AppEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => Some(AppEvent::Pointer(
            tracker.cursor_moved(Vec2::new(position.x as f32, position.y as f32), time_ms),
        )),
        WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } => Some(AppEvent::Pointer(
            tracker.button(*state == ElementState::Pressed, time_ms),
        )),
        WindowEvent::MouseWheel { delta, .. } => Some(AppEvent::Pointer(
            tracker.wheel(wheel_delta_px(*delta), time_ms),
        )),
        WindowEvent::Touch(touch) => tracker
            .touch(
                translate_touch_phase(touch.phase),
                touch.id,
                Vec2::new(touch.location.x as f32, touch.location.y as f32),
                time_ms,
            )
            .map(AppEvent::Pointer),
        WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
            translate_key(event.physical_key).map(AppEvent::KeyPressed)
        }
        WindowEvent::Resized(size) => Some(AppEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_towards_user_zooms_in() {
        assert!(wheel_delta_px(MouseScrollDelta::LineDelta(0.0, 1.0)) < 0.0);
        let px = winit::dpi::PhysicalPosition::new(0.0, -30.0);
        assert!((wheel_delta_px(MouseScrollDelta::PixelDelta(px)) - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn only_party_keys_translate() {
        assert_eq!(
            translate_key(PhysicalKey::Code(KeyCode::Escape)),
            Some(Key::Escape)
        );
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyA)), None);
    }
}
