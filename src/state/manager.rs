//! Central application state with change events and bounded undo

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::app_state::{AppState, StateKey, StatePatch, ToolRef};
use crate::config::StateConfig;
use crate::core::events::{Event, EventBus, ListenerId};
use crate::items::{Item, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEventKind {
    Changed,
    KeyChanged(StateKey),
    ItemAdded,
    ItemRemoved,
    ItemsCleared,
    DayNightToggled,
    Restored,
    Imported,
    Reset,
}

impl fmt::Display for StateEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateEventKind::Changed => f.write_str("state:changed"),
            StateEventKind::KeyChanged(key) => write!(f, "state:{}:changed", key),
            StateEventKind::ItemAdded => f.write_str("item:added"),
            StateEventKind::ItemRemoved => f.write_str("item:removed"),
            StateEventKind::ItemsCleared => f.write_str("items:cleared"),
            StateEventKind::DayNightToggled => f.write_str("daynight:toggled"),
            StateEventKind::Restored => f.write_str("state:restored"),
            StateEventKind::Imported => f.write_str("state:imported"),
            StateEventKind::Reset => f.write_str("state:reset"),
        }
    }
}

/// Notifications published by [`GameStateManager`]
///
/// Snapshots are shared, so holding on to one is cheap and it never changes
/// underneath the listener.
#[derive(Debug, Clone)]
pub enum StateEvent {
    Changed {
        current: Rc<AppState>,
        previous: Rc<AppState>,
    },
    /// One top-level field changed; read it from the two snapshots
    KeyChanged {
        key: StateKey,
        current: Rc<AppState>,
        previous: Rc<AppState>,
    },
    ItemAdded(Item),
    ItemRemoved(Item),
    /// Everything that was placed before the clear
    ItemsCleared(Vec<Item>),
    DayNightToggled { is_night: bool },
    Restored(Rc<AppState>),
    Imported(Rc<AppState>),
    Reset,
}

impl Event for StateEvent {
    type Kind = StateEventKind;

    fn kind(&self) -> StateEventKind {
        match self {
            StateEvent::Changed { .. } => StateEventKind::Changed,
            StateEvent::KeyChanged { key, .. } => StateEventKind::KeyChanged(*key),
            StateEvent::ItemAdded(_) => StateEventKind::ItemAdded,
            StateEvent::ItemRemoved(_) => StateEventKind::ItemRemoved,
            StateEvent::ItemsCleared(_) => StateEventKind::ItemsCleared,
            StateEvent::DayNightToggled { .. } => StateEventKind::DayNightToggled,
            StateEvent::Restored(_) => StateEventKind::Restored,
            StateEvent::Imported(_) => StateEventKind::Imported,
            StateEvent::Reset => StateEventKind::Reset,
        }
    }
}

/// Owns the one [`AppState`] record
///
/// Every mutation through [`set_state`](Self::set_state) replaces the record
/// wholesale and pushes the previous one onto a bounded history, so undo
/// always restores a complete state.
pub struct GameStateManager {
    state: Rc<AppState>,
    history: VecDeque<Rc<AppState>>,
    capacity: usize,
    events: EventBus<StateEvent>,
}

impl GameStateManager {
    pub fn new(config: &StateConfig) -> Self {
        Self::with_capacity(config.history_capacity)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Rc::new(AppState::default()),
            history: VecDeque::with_capacity(capacity),
            capacity,
            events: EventBus::new(),
        }
    }

    pub fn on<F>(&mut self, kind: StateEventKind, handler: F) -> ListenerId
    where
        F: FnMut(&StateEvent) -> anyhow::Result<()> + 'static,
    {
        self.events.on(kind, handler)
    }

    pub fn once<F>(&mut self, kind: StateEventKind, handler: F) -> ListenerId
    where
        F: FnMut(&StateEvent) -> anyhow::Result<()> + 'static,
    {
        self.events.once(kind, handler)
    }

    pub fn off(&mut self, kind: StateEventKind, id: Option<ListenerId>) -> usize {
        self.events.off(kind, id)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Independent copy of the current state
    pub fn get_state(&self) -> AppState {
        (*self.state).clone()
    }

    pub fn snapshot(&self) -> Rc<AppState> {
        Rc::clone(&self.state)
    }

    /// Merges `patch` into the state and records the previous state
    ///
    /// # Returns
    /// Keys whose value changed; a `state:<key>:changed` event fired for each
    pub fn set_state(&mut self, patch: StatePatch) -> Vec<StateKey> {
        let (next, changed) = self.state.merged(patch);
        let previous = std::mem::replace(&mut self.state, Rc::new(next));
        self.push_history(Rc::clone(&previous));

        let current = Rc::clone(&self.state);
        self.events.emit(&StateEvent::Changed {
            current: Rc::clone(&current),
            previous: Rc::clone(&previous),
        });
        for &key in &changed {
            self.events.emit(&StateEvent::KeyChanged {
                key,
                current: Rc::clone(&current),
                previous: Rc::clone(&previous),
            });
        }
        changed
    }

    fn push_history(&mut self, snapshot: Rc<AppState>) {
        if self.capacity == 0 {
            return;
        }
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    pub fn selected_tool(&self) -> Option<&ToolRef> {
        self.state.selected_tool.as_ref()
    }

    pub fn set_selected_tool(&mut self, tool: Option<ToolRef>) {
        self.set_state(StatePatch::new().selected_tool(tool));
    }

    pub fn placed_items(&self) -> &[Item] {
        &self.state.placed_items
    }

    /// In-place access for per-frame updates such as tweens and lamp lights
    ///
    /// Does not record history or emit events. Snapshots already taken keep
    /// their own copies.
    pub fn placed_items_mut(&mut self) -> &mut [Item] {
        &mut Rc::make_mut(&mut self.state).placed_items
    }

    /// Appends `item`; an item whose id is already placed is rejected
    pub fn add_item(&mut self, item: Item) -> bool {
        if self.state.item(item.id()).is_some() {
            log::warn!("Item {} is already placed", item.id());
            return false;
        }

        let mut items = self.state.placed_items.clone();
        items.push(item.clone());
        self.set_state(StatePatch::new().placed_items(items));
        self.events.emit(&StateEvent::ItemAdded(item));
        true
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Option<Item> {
        let index = self.state.placed_items.iter().position(|item| item.id() == id)?;

        let mut items = self.state.placed_items.clone();
        let removed = items.remove(index);
        self.set_state(StatePatch::new().placed_items(items));
        self.events.emit(&StateEvent::ItemRemoved(removed.clone()));
        Some(removed)
    }

    /// Empties the garden, emitting one `items:cleared` with the prior list
    pub fn clear_all_items(&mut self) -> Vec<Item> {
        let cleared = self.state.placed_items.clone();
        self.set_state(StatePatch::new().placed_items(Vec::new()));
        self.events.emit(&StateEvent::ItemsCleared(cleared.clone()));
        cleared
    }

    pub fn is_night_mode(&self) -> bool {
        self.state.is_night_mode
    }

    /// # Returns
    /// The new night-mode flag
    pub fn toggle_day_night(&mut self) -> bool {
        let is_night = !self.state.is_night_mode;
        self.set_state(StatePatch::new().night_mode(is_night));
        self.events.emit(&StateEvent::DayNightToggled { is_night });
        is_night
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.set_state(StatePatch::new().loading(loading));
    }

    pub fn set_tutorial_visible(&mut self, visible: bool) {
        self.set_state(StatePatch::new().tutorial_visible(visible));
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.capacity
    }

    /// Restores the most recent snapshot without recording a new one
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop_back() else {
            return false;
        };
        self.state = snapshot;
        self.events.emit(&StateEvent::Restored(Rc::clone(&self.state)));
        true
    }

    /// Back to a fresh garden with the loading screen already dismissed
    pub fn reset(&mut self) {
        self.state = Rc::new(AppState {
            is_loading: false,
            ..AppState::default()
        });
        self.history.clear();
        self.events.emit(&StateEvent::Reset);
    }

    pub(crate) fn emit(&mut self, event: StateEvent) -> usize {
        self.events.emit(&event)
    }
}

impl Default for GameStateManager {
    fn default() -> Self {
        Self::new(&StateConfig::default())
    }
}
