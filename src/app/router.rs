//! Event routing
//!
//! [`EventRouter`] is the listener registry stages attach to while mounted.
//! The platform layer (winit runner, tests) dispatches [`AppEvent`]s into it
//! and every listener registered for that event's kind is called in
//! registration order.
//!
//! Registrations are explicit and counted. A stage removes exactly the ids it
//! added when it unmounts, so [`EventRouter::listener_count`] returns to its
//! previous value after every mount / unmount cycle.

use rustc_hash::FxHashMap;

use crate::interaction::PointerEvent;

/// Keys the party reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Pointer(PointerEvent),
    /// New viewport size in physical pixels. May be zero while minimized.
    Resized { width: u32, height: u32 },
    KeyPressed(Key),
}

impl AppEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Pointer(_) => EventKind::Pointer,
            Self::Resized { .. } => EventKind::Resize,
            Self::KeyPressed(_) => EventKind::Keyboard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Pointer,
    Resize,
    Keyboard,
}

/// Handle returned by [`EventRouter::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&AppEvent)>;

#[derive(Default)]
pub struct EventRouter {
    next_id: u64,
    listeners: FxHashMap<EventKind, Vec<(ListenerId, Listener)>>,
}

impl EventRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&AppEvent) + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        log::trace!("Listener {id:?} added for {kind:?}");
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(index) = list.iter().position(|(lid, _)| *lid == id) {
                let (_, listener) = list.remove(index);
                drop(listener);
                log::trace!("Listener {id:?} removed");
                return true;
            }
        }
        false
    }

    /// Calls every listener registered for the event's kind.
    pub fn dispatch(&mut self, event: &AppEvent) {
        if let Some(list) = self.listeners.get_mut(&event.kind()) {
            for (_, listener) in list.iter_mut() {
                listener(event);
            }
        }
    }

    /// Total number of registered listeners across all kinds.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn dispatch_only_reaches_matching_kind() {
        let mut router = EventRouter::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        router.add_listener(EventKind::Keyboard, move |_| counter.set(counter.get() + 1));

        router.dispatch(&AppEvent::Resized {
            width: 10,
            height: 10,
        });
        assert_eq!(hits.get(), 0);
        router.dispatch(&AppEvent::KeyPressed(Key::Escape));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn removal_is_exact() {
        let mut router = EventRouter::new();
        let a = router.add_listener(EventKind::Pointer, |_| {});
        let _b = router.add_listener(EventKind::Pointer, |_| {});
        assert_eq!(router.listener_count(), 2);
        assert!(router.remove_listener(a));
        assert!(!router.remove_listener(a));
        assert_eq!(router.listener_count(), 1);
    }

    #[test]
    fn removal_releases_captured_state() {
        let mut router = EventRouter::new();
        let inbox = Rc::new(Cell::new(0));
        let captured = Rc::clone(&inbox);
        let id = router.add_listener(EventKind::Keyboard, move |_| captured.set(1));
        assert_eq!(Rc::strong_count(&inbox), 2);

        assert!(router.remove_listener(id));
        assert_eq!(Rc::strong_count(&inbox), 1);
        router.dispatch(&AppEvent::KeyPressed(Key::Escape));
        assert_eq!(inbox.get(), 0);
    }
}
