//! Save format for exporting and importing the garden
//!
//! ```json
//! { "version": "1.0.0", "timestamp": 1718000000000, "state": { ... } }
//! ```
//!
//! Items are stored as [`ItemRecord`]s and their meshes rebuilt on import.

use serde::{Deserialize, Serialize};

use super::app_state::{AppState, StatePatch, ToolRef};
use super::manager::{GameStateManager, StateEvent};
use crate::core::clock::epoch_millis;
use crate::error::{GardenError, Result};
use crate::items::{Item, ItemRecord};

pub const SAVE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Saves written without a version are read as the current one
    #[serde(default = "current_version")]
    pub version: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub state: Option<SavedState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    pub selected_tool: Option<ToolRef>,
    pub placed_items: Vec<ItemRecord>,
    pub is_night_mode: bool,
    pub is_loading: bool,
    pub tutorial_visible: bool,
}

fn current_version() -> String {
    SAVE_VERSION.to_string()
}

impl From<&AppState> for SavedState {
    fn from(state: &AppState) -> Self {
        Self {
            selected_tool: state.selected_tool.clone(),
            placed_items: state.placed_items.iter().map(Item::to_record).collect(),
            is_night_mode: state.is_night_mode,
            is_loading: state.is_loading,
            tutorial_visible: state.tutorial_visible,
        }
    }
}

impl SaveData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the version and that a state record is present
    pub fn validate(&self) -> Result<&SavedState> {
        let major = |version: &str| version.split('.').next().map(str::to_owned);
        if major(&self.version) != major(SAVE_VERSION) {
            return Err(GardenError::UnsupportedVersion(self.version.clone()));
        }
        self.state.as_ref().ok_or(GardenError::MissingState)
    }
}

impl GameStateManager {
    pub fn export_state(&self) -> SaveData {
        SaveData {
            version: SAVE_VERSION.to_string(),
            timestamp: epoch_millis(),
            state: Some(SavedState::from(self.state())),
        }
    }

    /// Replaces the whole state with a saved one
    ///
    /// Every item is rebuilt through `rebuild` before anything is touched, so
    /// an invalid payload leaves the current state as it was. The import is
    /// recorded in history like any other update.
    ///
    /// # Arguments
    /// * `data` - Parsed save payload
    /// * `rebuild` - Turns a record back into a live item, usually
    ///   [`ItemFactory::rebuild`](crate::items::ItemFactory::rebuild)
    pub fn import_state<F>(&mut self, data: &SaveData, mut rebuild: F) -> Result<()>
    where
        F: FnMut(&ItemRecord) -> Result<Item>,
    {
        let saved = data.validate()?;

        let mut items: Vec<Item> = Vec::with_capacity(saved.placed_items.len());
        for record in &saved.placed_items {
            if items.iter().any(|item| item.id() == &record.id) {
                log::warn!("Skipping duplicate item {} in save data", record.id);
                continue;
            }
            let mut item = rebuild(record)?;
            item.toggle_night_mode(saved.is_night_mode);
            items.push(item);
        }

        self.set_state(StatePatch::full(AppState {
            selected_tool: saved.selected_tool.clone(),
            placed_items: items,
            is_night_mode: saved.is_night_mode,
            is_loading: saved.is_loading,
            tutorial_visible: saved.tutorial_visible,
        }));
        log::info!("Imported {} items", self.placed_items().len());
        let snapshot = self.snapshot();
        self.emit(StateEvent::Imported(snapshot));
        Ok(())
    }

    pub fn export_json(&self) -> Result<String> {
        self.export_state().to_json()
    }

    pub fn import_json<F>(&mut self, json: &str, rebuild: F) -> Result<()>
    where
        F: FnMut(&ItemRecord) -> Result<Item>,
    {
        self.import_state(&SaveData::from_json(json)?, rebuild)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::AssetManager;
    use crate::items::{DecorationKind, FlowerKind, ItemFactory, ItemKind, TreeKind};
    use crate::state::StateEventKind;
    use cgmath::Vector3;
    use std::cell::Cell;
    use std::rc::Rc;

    fn populated() -> (GameStateManager, ItemFactory, AssetManager) {
        let mut assets = AssetManager::with_seed(3);
        let mut factory = ItemFactory::with_seed(3);
        let mut manager = GameStateManager::default();

        let kinds = [
            ItemKind::Tree(TreeKind::Oak),
            ItemKind::Flower(FlowerKind::Tulip),
            ItemKind::Decoration(DecorationKind::Lamp),
        ];
        for (i, kind) in kinds.into_iter().enumerate() {
            let mut item = factory.create(&mut assets, kind, Vector3::new(i as f32 - 1.5, 0.0, 2.25));
            item.set_rotation_y(0.5 * i as f32);
            manager.add_item(item);
        }
        manager.set_selected_tool(Some(ToolRef::from(ItemKind::Tree(TreeKind::Pine))));
        manager.set_loading(false);
        manager.toggle_day_night();
        (manager, factory, assets)
    }

    #[test]
    fn test_round_trip_is_deep_equal() {
        let (mut manager, factory, mut assets) = populated();
        let original = manager.get_state();
        let json = manager.export_json().unwrap();

        manager.reset();
        manager
            .import_json(&json, |record| factory.rebuild(&mut assets, record))
            .unwrap();

        assert_eq!(manager.get_state(), original);
        let lamp = &manager.placed_items()[2];
        assert!(lamp.is_night_mode());
        assert!(lamp.lights().iter().all(|light| light.visible));
    }

    #[test]
    fn test_rebuilt_meshes_match() {
        let (mut manager, factory, mut assets) = populated();
        let before: Vec<_> = manager.placed_items().iter().map(|i| i.group().parts.len()).collect();
        let data = manager.export_state();

        manager
            .import_state(&data, |record| factory.rebuild(&mut assets, record))
            .unwrap();
        let after: Vec<_> = manager.placed_items().iter().map(|i| i.group().parts.len()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_missing_state_is_rejected_without_mutation() {
        let (mut manager, factory, mut assets) = populated();
        let before = manager.get_state();
        let history = manager.history_len();

        let err = manager
            .import_json(r#"{"version":"1.0.0","timestamp":0}"#, |record| {
                factory.rebuild(&mut assets, record)
            })
            .unwrap_err();
        assert!(matches!(err, GardenError::MissingState));
        assert_eq!(manager.get_state(), before);
        assert_eq!(manager.history_len(), history);
    }

    #[test]
    fn test_missing_version_reads_as_current() {
        let (mut manager, factory, mut assets) = populated();
        let original = manager.get_state();
        let mut value: serde_json::Value = serde_json::from_str(&manager.export_json().unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("version");
        let json = value.to_string();

        assert_eq!(SaveData::from_json(&json).unwrap().version, SAVE_VERSION);
        manager.reset();
        manager
            .import_json(&json, |record| factory.rebuild(&mut assets, record))
            .unwrap();
        assert_eq!(manager.get_state(), original);

        // still needs a state record
        let err = SaveData::from_json(r#"{"timestamp":5}"#).unwrap().validate().unwrap_err();
        assert!(matches!(err, GardenError::MissingState));
    }

    #[test]
    fn test_foreign_major_version_is_rejected() {
        let (manager, _, _) = populated();
        let mut data = manager.export_state();
        data.version = "2.0.0".into();
        assert!(matches!(data.validate(), Err(GardenError::UnsupportedVersion(ref v)) if v == "2.0.0"));

        data.version = "1.4.2".into();
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_bad_record_aborts_import() {
        let (mut manager, factory, mut assets) = populated();
        let mut data = manager.export_state();
        if let Some(state) = data.state.as_mut() {
            state.placed_items[1].subtype = "cactus".into();
        }
        let before = manager.get_state();

        let result = manager.import_state(&data, |record| factory.rebuild(&mut assets, record));
        assert!(matches!(result, Err(GardenError::UnknownSubtype { .. })));
        assert_eq!(manager.get_state(), before);
    }

    #[test]
    fn test_import_emits_event() {
        let (mut manager, factory, mut assets) = populated();
        let data = manager.export_state();
        let imported = Rc::new(Cell::new(0));
        let counter = Rc::clone(&imported);
        manager.on(StateEventKind::Imported, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        manager
            .import_state(&data, |record| factory.rebuild(&mut assets, record))
            .unwrap();
        assert_eq!(imported.get(), 1);
    }

    #[test]
    fn test_json_shape() {
        let (manager, _, _) = populated();
        let value: serde_json::Value = serde_json::from_str(&manager.export_json().unwrap()).unwrap();
        assert_eq!(value["version"], "1.0.0");
        assert!(value["timestamp"].as_u64().unwrap() > 0);
        let state = &value["state"];
        assert_eq!(state["isNightMode"], true);
        assert_eq!(state["selectedTool"]["category"], "tree");
        assert_eq!(state["placedItems"][0]["subtype"], "oak");
        assert!(state["placedItems"][0]["seed"].is_u64());
    }
}
