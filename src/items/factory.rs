//! Item construction by category and subtype

use cgmath::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::builders;
use super::item::{Item, ItemId, ItemRecord};
use super::kind::{ItemCategory, ItemKind};
use crate::core::clock::epoch_millis;
use crate::error::Result;
use crate::gfx::resources::AssetManager;
use crate::gfx::scene::Transform;

/// Builds items and hands out their ids and mesh seeds
pub struct ItemFactory {
    serial: u64,
    seeds: StdRng,
}

impl ItemFactory {
    pub fn new() -> Self {
        Self {
            serial: 0,
            seeds: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Factory whose items get reproducible seeds
    pub fn with_seed(seed: u64) -> Self {
        Self {
            serial: 0,
            seeds: StdRng::seed_from_u64(seed),
        }
    }

    pub fn available_categories(&self) -> [ItemCategory; 4] {
        ItemCategory::ALL
    }

    /// Creates the item named by a tool button's `(category, subtype)` pair
    ///
    /// # Arguments
    /// * `assets` - Cache the item's geometry and materials come from
    /// * `category` - Family name such as `"tree"`
    /// * `subtype` - Variant name such as `"oak"`
    /// * `position` - Placement point; the item is dropped onto the ground
    ///
    /// # Returns
    /// The positioned item, or an error naming the unknown category or subtype
    pub fn create_item(
        &mut self,
        assets: &mut AssetManager,
        category: &str,
        subtype: &str,
        position: Vector3<f32>,
    ) -> Result<Item> {
        let kind = ItemKind::parse(category, subtype)?;
        Ok(self.create(assets, kind, position))
    }

    pub fn create(&mut self, assets: &mut AssetManager, kind: ItemKind, position: Vector3<f32>) -> Item {
        self.serial += 1;
        let id = ItemId::new(kind, epoch_millis(), self.serial);
        let seed = self.seeds.random::<u64>();

        let mut item = Item::new(id, kind, seed, builders::build(kind, assets, seed));
        item.set_position(position);
        log::debug!("Created {} as {}", kind, item.id());
        item
    }

    /// Moves the serial counter past every serial in `ids`, so items created
    /// afterwards never reuse an id that is already in the garden
    pub fn skip_past<'a>(&mut self, ids: impl IntoIterator<Item = &'a ItemId>) {
        if let Some(highest) = ids.into_iter().filter_map(ItemId::serial).max() {
            self.serial = self.serial.max(highest);
        }
    }

    /// Recreates a saved item with its original id, mesh and transform
    pub fn rebuild(&self, assets: &mut AssetManager, record: &ItemRecord) -> Result<Item> {
        let kind = ItemKind::from_parts(record.category, &record.subtype)?;
        let mut item = Item::new(
            record.id.clone(),
            kind,
            record.seed,
            builders::build(kind, assets, record.seed),
        );
        item.transform = Transform {
            position: record.position.into(),
            rotation: record.rotation.into(),
            scale: record.scale.into(),
        };
        Ok(item)
    }
}

impl Default for ItemFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GardenError;
    use crate::items::TreeKind;
    use std::collections::HashSet;

    #[test]
    fn test_unknown_category_fails() {
        let mut assets = AssetManager::with_seed(0);
        let mut factory = ItemFactory::with_seed(0);
        let result = factory.create_item(&mut assets, "vehicle", "car", Vector3::new(0.0, 0.0, 0.0));
        assert!(matches!(result, Err(GardenError::UnknownItemType(_))));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut assets = AssetManager::with_seed(0);
        let mut factory = ItemFactory::with_seed(0);
        let ids: HashSet<_> = (0..50)
            .map(|_| {
                factory
                    .create_item(&mut assets, "flower", "rose", Vector3::new(1.0, 0.0, 1.0))
                    .unwrap()
                    .id()
                    .clone()
            })
            .collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| id.as_str().starts_with("FlowerItem_")));
    }

    #[test]
    fn test_created_item_is_positioned_on_ground() {
        let mut assets = AssetManager::with_seed(0);
        let mut factory = ItemFactory::with_seed(0);
        let bench = factory
            .create_item(&mut assets, "furniture", "bench", Vector3::new(3.0, 1.5, -2.0))
            .unwrap();
        assert_eq!(bench.position(), Vector3::new(3.0, 0.0, -2.0));
        assert_eq!(bench.subtype(), "bench");
    }

    #[test]
    fn test_rebuild_matches_original() {
        let mut assets = AssetManager::with_seed(0);
        let mut factory = ItemFactory::with_seed(11);
        let mut stones = factory
            .create_item(&mut assets, "decoration", "stone", Vector3::new(-4.0, 0.0, 2.0))
            .unwrap();
        stones.set_rotation_y(1.25);

        let rebuilt = factory.rebuild(&mut assets, &stones.to_record()).unwrap();
        assert_eq!(rebuilt, stones);
        assert_eq!(rebuilt.group().parts.len(), stones.group().parts.len());
        for (a, b) in rebuilt.group().parts.iter().zip(&stones.group().parts) {
            assert_eq!(a.local, b.local);
        }
    }

    #[test]
    fn test_rebuild_rejects_foreign_subtype() {
        let mut assets = AssetManager::with_seed(0);
        let factory = ItemFactory::with_seed(0);
        let record = ItemRecord {
            id: ItemId::from("TreeItem_0_1"),
            category: ItemCategory::Tree,
            subtype: "tulip".to_string(),
            seed: 1,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        };
        assert!(factory.rebuild(&mut assets, &record).is_err());
    }

    #[test]
    fn test_skip_past_avoids_loaded_ids() {
        let mut assets = AssetManager::with_seed(0);
        let mut factory = ItemFactory::with_seed(0);
        let loaded = [ItemId::from("TreeItem_1718000000000_1f"), ItemId::from("custom-id")];

        factory.skip_past(&loaded);
        let origin = Vector3::new(0.0, 0.0, 0.0);
        let oak = factory.create(&mut assets, ItemKind::Tree(TreeKind::Oak), origin);
        assert_eq!(oak.id().serial(), Some(0x20));

        // never moves backwards
        factory.skip_past(&[ItemId::from("TreeItem_0_3")]);
        let pine = factory.create(&mut assets, ItemKind::Tree(TreeKind::Pine), origin);
        assert_eq!(pine.id().serial(), Some(0x21));
    }
}
