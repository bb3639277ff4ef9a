//! Platform-neutral pointer tracking.
//!
//! Windowing backends report cursor motion, button changes and individual
//! touch points separately. [`PointerTracker`] keeps the little state needed
//! to turn those into [`PointerEvent`]s: the last cursor position and the set
//! of fingers currently down.

use glam::Vec2;
use smallvec::SmallVec;

use crate::interaction::{PointerEvent, PointerKind, Touches};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    cursor: Vec2,
    touches: SmallVec<[(u64, Vec2); 4]>,
}

impl PointerTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position in physical pixels.
    #[must_use]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    #[must_use]
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    pub fn cursor_moved(&mut self, position: Vec2, time_ms: f64) -> PointerEvent {
        self.cursor = position;
        PointerEvent::new(time_ms, PointerKind::Move(position))
    }

    /// Primary button press or release at the last cursor position.
    pub fn button(&mut self, pressed: bool, time_ms: f64) -> PointerEvent {
        let kind = if pressed {
            PointerKind::Down(self.cursor)
        } else {
            PointerKind::Up(self.cursor)
        };
        PointerEvent::new(time_ms, kind)
    }

    /// Vertical wheel delta in pixels, positive away from the user.
    #[must_use]
    pub fn wheel(&self, delta_y: f32, time_ms: f64) -> PointerEvent {
        PointerEvent::new(time_ms, PointerKind::Wheel(delta_y))
    }

    /// Updates finger `id`. Returns `None` for updates about unknown fingers.
    pub fn touch(
        &mut self,
        phase: TouchPhase,
        id: u64,
        position: Vec2,
        time_ms: f64,
    ) -> Option<PointerEvent> {
        let kind = match phase {
            TouchPhase::Started => {
                match self.touches.iter_mut().find(|(tid, _)| *tid == id) {
                    Some(slot) => slot.1 = position,
                    None => self.touches.push((id, position)),
                }
                PointerKind::TouchStart(self.positions())
            }
            TouchPhase::Moved => {
                let slot = self.touches.iter_mut().find(|(tid, _)| *tid == id)?;
                slot.1 = position;
                PointerKind::TouchMove(self.positions())
            }
            TouchPhase::Ended => {
                self.lift(id)?;
                PointerKind::TouchEnd {
                    position,
                    remaining: self.positions(),
                }
            }
            TouchPhase::Cancelled => {
                self.lift(id)?;
                PointerKind::TouchCancel {
                    remaining: self.positions(),
                }
            }
        };
        Some(PointerEvent::new(time_ms, kind))
    }

    fn lift(&mut self, id: u64) -> Option<()> {
        let index = self.touches.iter().position(|(tid, _)| *tid == id)?;
        self.touches.remove(index);
        Some(())
    }

    fn positions(&self) -> Touches {
        self.touches.iter().map(|(_, p)| *p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_uses_last_cursor() {
        let mut tracker = PointerTracker::new();
        tracker.cursor_moved(Vec2::new(10.0, 20.0), 0.0);
        let down = tracker.button(true, 1.0);
        assert_eq!(down.kind, PointerKind::Down(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn second_finger_reports_both_touches() {
        let mut tracker = PointerTracker::new();
        tracker.touch(TouchPhase::Started, 1, Vec2::ZERO, 0.0);
        let event = tracker
            .touch(TouchPhase::Started, 2, Vec2::new(100.0, 0.0), 0.0)
            .map(|e| e.kind);
        let Some(PointerKind::TouchStart(touches)) = event else {
            panic!("expected a touch start, got {event:?}");
        };
        assert_eq!(touches.len(), 2);

        let end = tracker.touch(TouchPhase::Ended, 1, Vec2::ZERO, 1.0);
        assert!(matches!(
            end.map(|e| e.kind),
            Some(PointerKind::TouchEnd { remaining, .. }) if remaining.len() == 1
        ));
        assert!(tracker.touch(TouchPhase::Moved, 9, Vec2::ZERO, 2.0).is_none());
    }

    #[test]
    fn cancelled_finger_is_reported_as_cancel() {
        let mut tracker = PointerTracker::new();
        tracker.touch(TouchPhase::Started, 1, Vec2::new(100.0, 100.0), 0.0);
        let cancel = tracker.touch(TouchPhase::Cancelled, 1, Vec2::new(100.0, 100.0), 50.0);
        assert!(matches!(
            cancel.map(|e| e.kind),
            Some(PointerKind::TouchCancel { remaining }) if remaining.is_empty()
        ));
        assert_eq!(tracker.touch_count(), 0);
        assert!(tracker.touch(TouchPhase::Cancelled, 1, Vec2::ZERO, 60.0).is_none());
    }
}
