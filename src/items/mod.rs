//! # Garden Items
//!
//! Placeable decorations: the closed [`ItemKind`] set, the [`Item`] itself,
//! procedural mesh recipes and the [`ItemFactory`] that ties them together.
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Vector3;
//! use garden_designer::gfx::resources::AssetManager;
//! use garden_designer::items::ItemFactory;
//!
//! let mut assets = AssetManager::with_seed(1);
//! let mut factory = ItemFactory::with_seed(1);
//! let lamp = factory
//!     .create_item(&mut assets, "decoration", "lamp", Vector3::new(2.0, 0.0, 2.0))
//!     .unwrap();
//! assert_eq!(lamp.lights().len(), 1);
//! assert!(factory.create_item(&mut assets, "boat", "canoe", Vector3::new(0.0, 0.0, 0.0)).is_err());
//! ```

pub mod builders;
pub mod factory;
pub mod item;
pub mod kind;

pub use factory::ItemFactory;
pub use item::{Item, ItemId, ItemRecord};
pub use kind::{DecorationKind, FlowerKind, FurnitureKind, ItemCategory, ItemKind, TreeKind};
