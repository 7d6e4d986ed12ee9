//! Event Emitter
//!
//! Per-instance subscription map. Listeners are snapshotted before
//! dispatch, so a listener may subscribe or unsubscribe while running.

use std::cell::{Cell, RefCell};
use std::hash::Hash;
use std::rc::Rc;

/// Subscription handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler<P> = Rc<dyn Fn(&P)>;

pub struct EventEmitter<E, P> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, E, Handler<P>)>>,
}

impl<E: Copy + Eq + Hash, P> EventEmitter<E, P> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn on(&self, event: E, handler: impl Fn(&P) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.listeners.borrow_mut().push((id, event, Rc::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed to `event`
    pub fn off(&self, event: E, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(l, e, _)| !(*l == id && *e == event));
        listeners.len() != before
    }

    /// Invoke every listener of `event` in subscription order. Returns the
    /// number invoked.
    pub fn emit(&self, event: E, payload: &P) -> usize {
        let handlers: Vec<Handler<P>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    pub fn listener_count(&self, event: E) -> usize {
        self.listeners.borrow().iter().filter(|(_, e, _)| *e == event).count()
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<E: Copy + Eq + Hash, P> Default for EventEmitter<E, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P> std::fmt::Debug for EventEmitter<E, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Ev {
        A,
        B,
    }

    #[test]
    fn test_emit_only_matching() {
        let emitter: EventEmitter<Ev, u32> = EventEmitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        emitter.on(Ev::A, move |p| s.borrow_mut().push(*p));

        assert_eq!(emitter.emit(Ev::B, &1), 0);
        assert_eq!(emitter.emit(Ev::A, &2), 1);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_off_requires_matching_event() {
        let emitter: EventEmitter<Ev, ()> = EventEmitter::new();
        let id = emitter.on(Ev::A, |_| {});

        assert!(!emitter.off(Ev::B, id));
        assert!(emitter.off(Ev::A, id));
        assert_eq!(emitter.listener_count(Ev::A), 0);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let emitter: Rc<EventEmitter<Ev, ()>> = Rc::new(EventEmitter::new());
        let calls = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(None));

        let (e, c, o) = (Rc::clone(&emitter), Rc::clone(&calls), Rc::clone(&own_id));
        let id = emitter.on(Ev::A, move |_| {
            c.set(c.get() + 1);
            if let Some(id) = o.get() {
                e.off(Ev::A, id);
            }
        });
        own_id.set(Some(id));

        emitter.emit(Ev::A, &());
        emitter.emit(Ev::A, &());
        assert_eq!(calls.get(), 1);
    }
}
