//! Pointer interaction
//!
//! [`InteractionController`] turns raw pointer and touch events into
//! [`Gesture`]s without touching the scene. [`resolve_click`] then hit-tests
//! a click against the party's pickable objects.
//!
//! ```text
//!            down / 1-touch start           2-touch start
//!   Idle  ───────────────────────▶ Dragging ─────────────▶ Pinching
//!    ▲                                │  ▲                    │
//!    └──────── up / last touch end ───┘  └── one touch left ──┘
//! ```

use glam::Vec2;
use smallvec::{SmallVec, smallvec};

use crate::animation::PartySimulation;
use crate::animation::orbit::AUTO_ROTATE_RESUME_MS;
use crate::party::PartyHandles;
use crate::scene::{Raycaster, Scene};

/// Pointer travel (in physical pixels) below which a press counts as a click.
pub const CLICK_TOLERANCE_PX: f32 = 4.0;
pub const WHEEL_ZOOM_SPEED: f32 = 0.01;
pub const PINCH_ZOOM_SPEED: f32 = 0.01;

pub type Touches = SmallVec<[Vec2; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub enum PointerKind {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    /// Vertical wheel delta in pixels; positive scrolls away.
    Wheel(f32),
    /// Active touches after a finger went down.
    TouchStart(Touches),
    TouchMove(Touches),
    /// A finger was lifted at `position`; `remaining` are still down.
    TouchEnd { position: Vec2, remaining: Touches },
    /// The platform took a finger away (system gesture, palm rejection).
    /// Never produces a click.
    TouchCancel { remaining: Touches },
}

/// A pointer event stamped with wall-clock milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub time_ms: f64,
    pub kind: PointerKind,
}

impl PointerEvent {
    #[must_use]
    pub fn new(time_ms: f64, kind: PointerKind) -> Self {
        Self { time_ms, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Pixel deltas of a drag step.
    Rotate { dx: f32, dy: f32 },
    /// Change of camera distance, already scaled to world units.
    Zoom(f32),
    SuspendAutoRotate,
    ResumeAutoRotateAt(f64),
    /// A press released without dragging, in window pixels.
    Click(Vec2),
    /// Cursor position while no button is held.
    Hover(Vec2),
}

pub type Gestures = SmallVec<[Gesture; 2]>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Dragging {
        last: Vec2,
        /// Accumulated pointer travel since the press.
        travelled: f32,
    },
    Pinching {
        distance: f32,
    },
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn handle(&mut self, event: &PointerEvent) -> Gestures {
        let now = event.time_ms;
        match &event.kind {
            PointerKind::Down(p) => self.press(*p),
            PointerKind::Move(p) => match self.state {
                InteractionState::Dragging { .. } => self.drag_to(*p),
                _ => smallvec![Gesture::Hover(*p)],
            },
            PointerKind::Up(p) => self.release(*p, now),
            PointerKind::Wheel(delta_y) => smallvec![Gesture::Zoom(delta_y * WHEEL_ZOOM_SPEED)],
            PointerKind::TouchStart(touches) => match touches.as_slice() {
                [] => Gestures::new(),
                [single] => self.press(*single),
                [a, b, ..] => {
                    self.state = InteractionState::Pinching {
                        distance: a.distance(*b),
                    };
                    smallvec![Gesture::SuspendAutoRotate]
                }
            },
            PointerKind::TouchMove(touches) => match (self.state, touches.as_slice()) {
                (InteractionState::Dragging { .. }, [single]) => self.drag_to(*single),
                (InteractionState::Pinching { distance }, [a, b, ..]) => {
                    let current = a.distance(*b);
                    self.state = InteractionState::Pinching { distance: current };
                    smallvec![Gesture::Zoom(-(current - distance) * PINCH_ZOOM_SPEED)]
                }
                _ => Gestures::new(),
            },
            PointerKind::TouchEnd {
                position,
                remaining,
            } => match remaining.as_slice() {
                [] => self.release(*position, now),
                remaining => self.keep_touches(remaining),
            },
            PointerKind::TouchCancel { remaining } => match remaining.as_slice() {
                [] => self.cancel(now),
                remaining => self.keep_touches(remaining),
            },
        }
    }

    /// Some fingers are still down after one left.
    fn keep_touches(&mut self, remaining: &[Vec2]) -> Gestures {
        if let [single] = remaining {
            // A single finger left over continues as a drag that can no
            // longer become a tap.
            self.state = InteractionState::Dragging {
                last: *single,
                travelled: f32::INFINITY,
            };
        }
        Gestures::new()
    }

    /// Ends the gesture without a click.
    fn cancel(&mut self, now_ms: f64) -> Gestures {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Idle => Gestures::new(),
            _ => smallvec![Gesture::ResumeAutoRotateAt(now_ms + AUTO_ROTATE_RESUME_MS)],
        }
    }

    fn press(&mut self, position: Vec2) -> Gestures {
        self.state = InteractionState::Dragging {
            last: position,
            travelled: 0.0,
        };
        smallvec![Gesture::SuspendAutoRotate]
    }

    fn drag_to(&mut self, position: Vec2) -> Gestures {
        let InteractionState::Dragging { last, travelled } = self.state else {
            return Gestures::new();
        };
        let delta = position - last;
        self.state = InteractionState::Dragging {
            last: position,
            travelled: travelled + delta.length(),
        };
        smallvec![Gesture::Rotate {
            dx: delta.x,
            dy: delta.y,
        }]
    }

    fn release(&mut self, position: Vec2, now_ms: f64) -> Gestures {
        let previous = std::mem::replace(&mut self.state, InteractionState::Idle);
        let mut gestures = Gestures::new();
        match previous {
            InteractionState::Idle => return gestures,
            InteractionState::Dragging { last, travelled } => {
                let total = travelled + position.distance(last);
                if total <= CLICK_TOLERANCE_PX {
                    gestures.push(Gesture::Click(position));
                }
            }
            InteractionState::Pinching { .. } => {}
        }
        gestures.push(Gesture::ResumeAutoRotateAt(now_ms + AUTO_ROTATE_RESUME_MS));
        gestures
    }
}

/// Converts a window position to normalized device coordinates.
/// Returns `None` for an empty viewport.
#[must_use]
pub fn screen_to_ndc(position: Vec2, width: u32, height: u32) -> Option<Vec2> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(Vec2::new(
        position.x / width as f32 * 2.0 - 1.0,
        -(position.y / height as f32 * 2.0 - 1.0),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    OpenWish(String),
    /// Indices of the candles this click blew out.
    BlewOut(SmallVec<[usize; 4]>),
    Miss,
}

/// Hit-tests a click at `ndc` through the scene's active camera.
///
/// The envelope takes priority: hitting it opens a wish and skips the candle
/// tests. Each candle is then tested on its own; lit candles that are hit go
/// out. World matrices must be current.
pub fn resolve_click(
    scene: &Scene,
    handles: &PartyHandles,
    simulation: &mut PartySimulation,
    ndc: Vec2,
    wish: impl FnOnce() -> String,
) -> ClickOutcome {
    let Some(raycaster) = scene
        .main_camera()
        .and_then(|camera| Raycaster::from_camera(camera, ndc))
    else {
        return ClickOutcome::Miss;
    };

    if raycaster.hits_subtree(scene, handles.envelope) {
        return ClickOutcome::OpenWish(wish());
    }

    let mut blown = SmallVec::new();
    for (index, candle) in handles.candles.iter().enumerate() {
        if raycaster.hits_subtree(scene, candle.root) && simulation.blow_out(index) {
            blown.push(index);
        }
    }

    if blown.is_empty() {
        log::trace!("Click at {ndc} hit nothing");
        ClickOutcome::Miss
    } else {
        ClickOutcome::BlewOut(blown)
    }
}
