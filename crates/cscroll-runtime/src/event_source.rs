#![forbid(unsafe_code)]

//! Keyboard event sources.
//!
//! The coordinator never reaches a global notification center. It subscribes
//! to an injected [`KeyboardEventSource`]; hosts forward platform
//! notifications into one, and tests post synthetic events to an
//! [`EventBus`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cscroll_core::event::{KeyboardEvent, KeyboardEventKind};
use tracing::trace;

/// Identifier of a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Handler invoked with each matching event.
pub type KeyboardHandler = Rc<dyn Fn(&KeyboardEvent)>;

/// Delivers keyboard notifications to subscribers.
pub trait KeyboardEventSource {
    /// Call `handler` for every event of `kind` until unsubscribed.
    fn subscribe(&self, kind: KeyboardEventKind, handler: KeyboardHandler) -> ListenerId;

    /// Remove a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: ListenerId);
}

/// In-process [`KeyboardEventSource`].
///
/// Handlers may subscribe, unsubscribe, or post from inside a handler: the
/// listener list is snapshotted before delivery.
#[derive(Default)]
pub struct EventBus {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, KeyboardEventKind, KeyboardHandler)>>,
}

impl EventBus {
    /// Create a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every listener subscribed to its kind, in
    /// subscription order. Returns the number of handlers called.
    pub fn post(&self, event: KeyboardEvent) -> usize {
        let handlers: Vec<KeyboardHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();
        trace!(kind = ?event.kind, listeners = handlers.len(), "posting keyboard event");
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Number of listeners subscribed to `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: KeyboardEventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    /// Total number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether no listener is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}

impl KeyboardEventSource for EventBus {
    fn subscribe(&self, kind: KeyboardEventKind, handler: KeyboardHandler) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, kind, handler));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(listener, _, _)| *listener != id);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
