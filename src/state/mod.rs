//! # State Module
//!
//! The single [`AppState`] record behind the UI and scene, the
//! [`GameStateManager`] that mutates it with change events and bounded undo,
//! and the JSON save format.
//!
//! ## Usage
//!
//! ```
//! use garden_designer::state::{GameStateManager, StatePatch};
//!
//! let mut state = GameStateManager::default();
//! state.set_state(StatePatch::new().loading(false).tutorial_visible(false));
//! assert!(!state.state().is_loading);
//!
//! assert!(state.undo());
//! assert!(state.state().is_loading);
//! ```

pub mod app_state;
pub mod manager;
pub mod save;

pub use app_state::{AppState, StateKey, StatePatch, ToolRef};
pub use manager::{GameStateManager, StateEvent, StateEventKind};
pub use save::{SaveData, SavedState, SAVE_VERSION};
