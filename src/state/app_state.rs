//! The application state record and partial updates to it

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::items::{Item, ItemCategory, ItemKind};

/// The tool picked in the panel: which item a click will place
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolRef {
    pub category: ItemCategory,
    pub subtype: String,
}

impl ToolRef {
    pub fn new(category: ItemCategory, subtype: &str) -> Self {
        Self {
            category,
            subtype: subtype.to_string(),
        }
    }

    pub fn kind(&self) -> Result<ItemKind> {
        ItemKind::from_parts(self.category, &self.subtype)
    }
}

impl From<ItemKind> for ToolRef {
    fn from(kind: ItemKind) -> Self {
        Self::new(kind.category(), kind.subtype())
    }
}

impl fmt::Display for ToolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.subtype)
    }
}

/// Everything the UI and scene derive from
///
/// `placed_items` keeps placement order and never holds two items with the
/// same id.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub selected_tool: Option<ToolRef>,
    pub placed_items: Vec<Item>,
    pub is_night_mode: bool,
    pub is_loading: bool,
    pub tutorial_visible: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selected_tool: None,
            placed_items: Vec::new(),
            is_night_mode: false,
            is_loading: true,
            tutorial_visible: true,
        }
    }
}

/// Top-level fields of [`AppState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    SelectedTool,
    PlacedItems,
    IsNightMode,
    IsLoading,
    TutorialVisible,
}

impl StateKey {
    pub const ALL: [StateKey; 5] = [
        StateKey::SelectedTool,
        StateKey::PlacedItems,
        StateKey::IsNightMode,
        StateKey::IsLoading,
        StateKey::TutorialVisible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::SelectedTool => "selectedTool",
            StateKey::PlacedItems => "placedItems",
            StateKey::IsNightMode => "isNightMode",
            StateKey::IsLoading => "isLoading",
            StateKey::TutorialVisible => "tutorialVisible",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial update: `Some` fields overwrite, `None` fields are kept
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub selected_tool: Option<Option<ToolRef>>,
    pub placed_items: Option<Vec<Item>>,
    pub is_night_mode: Option<bool>,
    pub is_loading: Option<bool>,
    pub tutorial_visible: Option<bool>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_tool(mut self, tool: Option<ToolRef>) -> Self {
        self.selected_tool = Some(tool);
        self
    }

    pub fn placed_items(mut self, items: Vec<Item>) -> Self {
        self.placed_items = Some(items);
        self
    }

    pub fn night_mode(mut self, night: bool) -> Self {
        self.is_night_mode = Some(night);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.is_loading = Some(loading);
        self
    }

    pub fn tutorial_visible(mut self, visible: bool) -> Self {
        self.tutorial_visible = Some(visible);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// A patch that overwrites every field with `state`'s
    pub fn full(state: AppState) -> Self {
        Self {
            selected_tool: Some(state.selected_tool),
            placed_items: Some(state.placed_items),
            is_night_mode: Some(state.is_night_mode),
            is_loading: Some(state.is_loading),
            tutorial_visible: Some(state.tutorial_visible),
        }
    }
}

impl AppState {
    /// Returns the merged state and the keys whose value actually changed
    pub fn merged(&self, patch: StatePatch) -> (AppState, Vec<StateKey>) {
        let mut next = self.clone();
        let mut changed = Vec::new();

        fn assign<T: PartialEq>(
            slot: &mut T,
            value: Option<T>,
            key: StateKey,
            changed: &mut Vec<StateKey>,
        ) {
            if let Some(value) = value {
                if *slot != value {
                    changed.push(key);
                }
                *slot = value;
            }
        }

        assign(&mut next.selected_tool, patch.selected_tool, StateKey::SelectedTool, &mut changed);
        assign(&mut next.placed_items, patch.placed_items, StateKey::PlacedItems, &mut changed);
        assign(&mut next.is_night_mode, patch.is_night_mode, StateKey::IsNightMode, &mut changed);
        assign(&mut next.is_loading, patch.is_loading, StateKey::IsLoading, &mut changed);
        assign(
            &mut next.tutorial_visible,
            patch.tutorial_visible,
            StateKey::TutorialVisible,
            &mut changed,
        );

        (next, changed)
    }

    pub fn item(&self, id: &crate::items::ItemId) -> Option<&Item> {
        self.placed_items.iter().find(|item| item.id() == id)
    }
}
