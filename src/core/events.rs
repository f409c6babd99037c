//! Typed publish/subscribe bus
//!
//! Components own an [`EventBus`] field and expose `on`/`off`/`once` on top of
//! it. Listeners for one event kind run synchronously in registration order.
//! A listener that returns an error is logged and skipped; the remaining
//! listeners still run.
//!
//! ## Usage
//!
//! ```
//! use garden_designer::core::events::{Event, EventBus};
//! use std::fmt;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum PingKind { Ping }
//!
//! impl fmt::Display for PingKind {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         f.write_str("ping")
//!     }
//! }
//!
//! struct Ping(u32);
//!
//! impl Event for Ping {
//!     type Kind = PingKind;
//!     fn kind(&self) -> PingKind { PingKind::Ping }
//! }
//!
//! let mut bus = EventBus::new();
//! bus.on(PingKind::Ping, |ping: &Ping| {
//!     assert_eq!(ping.0, 7);
//!     Ok(())
//! });
//! assert_eq!(bus.emit(&Ping(7)), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// An event payload that knows which channel it belongs to
pub trait Event {
    type Kind: Copy + Eq + Hash + fmt::Display;

    fn kind(&self) -> Self::Kind;
}

/// Identifies a single registration so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler<E> = Box<dyn FnMut(&E) -> anyhow::Result<()>>;

struct Listener<E> {
    id: ListenerId,
    once: bool,
    handler: Handler<E>,
}

pub struct EventBus<E: Event> {
    listeners: HashMap<E::Kind, Vec<Listener<E>>>,
    next_id: u64,
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    /// Registers `handler` for every event of `kind`
    pub fn on<F>(&mut self, kind: E::Kind, handler: F) -> ListenerId
    where
        F: FnMut(&E) -> anyhow::Result<()> + 'static,
    {
        self.register(kind, false, Box::new(handler))
    }

    /// Registers `handler` for the next event of `kind` only
    pub fn once<F>(&mut self, kind: E::Kind, handler: F) -> ListenerId
    where
        F: FnMut(&E) -> anyhow::Result<()> + 'static,
    {
        self.register(kind, true, Box::new(handler))
    }

    fn register(&mut self, kind: E::Kind, once: bool, handler: Handler<E>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(kind).or_default().push(Listener { id, once, handler });
        id
    }

    /// Removes one listener, or every listener of `kind` when `id` is `None`
    ///
    /// # Returns
    /// Number of listeners removed
    pub fn off(&mut self, kind: E::Kind, id: Option<ListenerId>) -> usize {
        match id {
            None => self.listeners.remove(&kind).map_or(0, |list| list.len()),
            Some(id) => {
                let Some(list) = self.listeners.get_mut(&kind) else {
                    return 0;
                };
                let before = list.len();
                list.retain(|listener| listener.id != id);
                let removed = before - list.len();
                if list.is_empty() {
                    self.listeners.remove(&kind);
                }
                removed
            }
        }
    }

    /// Dispatches `event` to its listeners in registration order
    ///
    /// # Returns
    /// Number of listeners invoked, including ones that failed
    pub fn emit(&mut self, event: &E) -> usize {
        let kind = event.kind();
        let Some(list) = self.listeners.get_mut(&kind) else {
            return 0;
        };

        let mut fired_once = Vec::new();
        for listener in list.iter_mut() {
            if let Err(err) = (listener.handler)(event) {
                log::error!("Error in event handler for {}: {:#}", kind, err);
            }
            if listener.once {
                fired_once.push(listener.id);
            }
        }

        let invoked = list.len();
        if !fired_once.is_empty() {
            list.retain(|listener| !fired_once.contains(&listener.id));
            if list.is_empty() {
                self.listeners.remove(&kind);
            }
        }
        invoked
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
