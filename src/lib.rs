//! Garden Designer
//!
//! An interactive 3D garden designer built on wgpu and winit: place trees,
//! flowers, furniture and decorations on a bounded lawn, switch between day
//! and night, undo changes and save layouts as JSON.
//!
//! The [`Game`] orchestrator is generic over its render target and user
//! interface, so everything except the window itself runs headless:
//!
//! ```rust
//! use garden_designer::prelude::*;
//!
//! let config = GameConfig::default();
//! let ui = UiController::new(&config.ui);
//! let mut game = Game::new(config, HeadlessTarget::new(800, 600), ui);
//!
//! game.select_tool(Some(ToolRef::from(ItemKind::Tree(TreeKind::Oak))));
//! game.place_at(Vector3::new(1.0, 0.0, 2.0)).unwrap();
//! game.tick().unwrap();
//! assert_eq!(game.placed_items().len(), 1);
//! ```

pub mod animation;
pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod garden;
pub mod gfx;
pub mod input;
pub mod items;
pub mod prelude;
pub mod state;
pub mod ui;
pub mod wgpu_utils;

pub use app::GardenApp;
pub use error::{GardenError, Result};
pub use game::{Game, GameEvent, GameEventKind};
