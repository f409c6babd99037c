//! # Garden Designer Prelude
//!
//! Commonly used types in one import.
//!
//! ## Usage
//!
//! ```rust
//! use garden_designer::prelude::*;
//! ```

// Orchestration
pub use crate::app::GardenApp;
pub use crate::config::GameConfig;
pub use crate::error::{GardenError, Result};
pub use crate::game::{Game, GameEvent, GameEventKind};

// Items and the garden
pub use crate::garden::Garden;
pub use crate::items::{
    DecorationKind, FlowerKind, FurnitureKind, Item, ItemCategory, ItemFactory, ItemId, ItemKind,
    TreeKind,
};

// State, UI and input
pub use crate::input::InputSystem;
pub use crate::state::{AppState, GameStateManager, StatePatch, ToolRef};
pub use crate::ui::{Severity, UiAdapter, UiController};

// Time and events
pub use crate::core::{Clock, EventBus, ManualClock};

// Rendering
pub use crate::gfx::{HeadlessTarget, RenderTarget, Scene};

pub use cgmath::Vector3;
