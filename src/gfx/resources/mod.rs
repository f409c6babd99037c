//! Resource management
//!
//! CPU-side assets (geometry, materials, textures) and their GPU uploads.

pub mod asset_manager;
pub mod material;
pub mod texture;
pub mod texture_resource;

/// Identity of a cached asset, stable for the asset's lifetime
pub type AssetId = u64;

pub use asset_manager::{AssetManager, AssetStats, Geometry};
pub use material::{rgb_from_hex, Material, MaterialDesc, MaterialKind};
pub use texture::Texture;
pub use texture_resource::{DepthBuffer, TextureResource};
