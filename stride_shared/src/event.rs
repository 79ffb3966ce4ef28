//! Event queue between the window and the frame loop.
//!
//! Window callbacks push [`KeyEvent`]s and [`ResizeEvent`]s whenever they
//! fire; the frame driver drains them once per frame, in arrival order.
//! Controller output ([`AnimEvent`](crate::animation::AnimEvent)) goes through
//! the same bus so observers do not need a handle on the controller.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use crate::input::KeyCode;

/// Raw key transition from the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub down: bool,
}

/// New drawable size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
}

/// Typed event bus.
#[derive(Default)]
pub struct EventBus {
    queues: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl EventBus {
    /// Pushes an event into the queue.
    pub fn push<E: 'static + Send + Sync>(&mut self, e: E) {
        let q = self
            .queues
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<E>::new()));
        if let Some(q) = q.downcast_mut::<Vec<E>>() {
            q.push(e);
        }
    }

    /// Drains all queued events of a type.
    pub fn drain<E: 'static + Send + Sync>(&mut self) -> Vec<E> {
        self.queues
            .remove(&TypeId::of::<E>())
            .and_then(|boxed| boxed.downcast::<Vec<E>>().ok())
            .map(|boxed| *boxed)
            .unwrap_or_default()
    }

    /// Number of queued events of a type.
    pub fn pending<E: 'static + Send + Sync>(&self) -> usize {
        self.queues
            .get(&TypeId::of::<E>())
            .and_then(|boxed| boxed.downcast_ref::<Vec<E>>())
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order_per_type() {
        let mut bus = EventBus::default();
        bus.push(KeyEvent {
            code: KeyCode::W,
            down: true,
        });
        bus.push(ResizeEvent {
            width: 800,
            height: 600,
        });
        bus.push(KeyEvent {
            code: KeyCode::W,
            down: false,
        });
        assert_eq!(bus.pending::<KeyEvent>(), 2);

        let keys = bus.drain::<KeyEvent>();
        assert_eq!(keys.len(), 2);
        assert!(keys[0].down && !keys[1].down);
        assert_eq!(bus.pending::<KeyEvent>(), 0);
        assert_eq!(bus.drain::<ResizeEvent>().len(), 1);
    }

    #[test]
    fn drain_of_unknown_type_is_empty() {
        let mut bus = EventBus::default();
        assert!(bus.drain::<ResizeEvent>().is_empty());
    }
}
