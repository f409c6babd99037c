//! Surface materials
//!
//! A [`MaterialDesc`] is the full description of a look (shading model, color,
//! opacity, texture) and the key the asset manager caches [`Material`]s under.
//! Parts sharing a description share one material.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::texture::Texture;
use super::AssetId;

/// Converts `0xRRGGBB` to `[r, g, b]` in `0..=1`
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

/// Shading model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Diffuse only
    Lambert,
    /// Diffuse with a specular highlight
    Phong,
    /// Unlit flat color
    Basic,
}

/// Cache key and constructor input for a material
#[derive(Debug, Clone)]
pub struct MaterialDesc {
    pub kind: MaterialKind,
    pub color: u32,
    /// `Some(opacity)` marks the material as transparent
    pub opacity: Option<f32>,
    /// Name of a texture registered with the asset manager
    pub map: Option<String>,
}

impl MaterialDesc {
    pub fn lambert(color: u32) -> Self {
        Self {
            kind: MaterialKind::Lambert,
            color,
            opacity: None,
            map: None,
        }
    }

    pub fn phong(color: u32) -> Self {
        Self {
            kind: MaterialKind::Phong,
            ..Self::lambert(color)
        }
    }

    pub fn basic(color: u32) -> Self {
        Self {
            kind: MaterialKind::Basic,
            ..Self::lambert(color)
        }
    }

    pub fn transparent(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity.clamp(0.0, 1.0));
        self
    }

    pub fn with_map(mut self, texture: &str) -> Self {
        self.map = Some(texture.to_string());
        self
    }
}

impl PartialEq for MaterialDesc {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.color == other.color
            && self.opacity.map(f32::to_bits) == other.opacity.map(f32::to_bits)
            && self.map == other.map
    }
}

impl Eq for MaterialDesc {}

impl Hash for MaterialDesc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.color.hash(state);
        self.opacity.map(f32::to_bits).hash(state);
        self.map.hash(state);
    }
}

/// Material with resolved color and texture
#[derive(Debug, Clone)]
pub struct Material {
    pub id: AssetId,
    pub kind: MaterialKind,
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub emissive: [f32; 3],
    pub map: Option<Arc<Texture>>,
}

impl Material {
    pub fn from_desc(id: AssetId, desc: &MaterialDesc, map: Option<Arc<Texture>>) -> Self {
        Self {
            id,
            kind: desc.kind,
            color: rgb_from_hex(desc.color),
            opacity: desc.opacity.unwrap_or(1.0),
            transparent: desc.opacity.is_some(),
            emissive: [0.0; 3],
            map,
        }
    }

    /// Base color with opacity in the alpha channel
    pub fn rgba(&self) -> [f32; 4] {
        [self.color[0], self.color[1], self.color[2], self.opacity]
    }

    pub fn is_lit(&self) -> bool {
        self.kind != MaterialKind::Basic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        assert_eq!(rgb_from_hex(0xFF0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb_from_hex(0x000000), [0.0, 0.0, 0.0]);
        let sky = rgb_from_hex(0x87CEEB);
        assert!((sky[0] - 135.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_desc_equality_tracks_opacity() {
        let water = MaterialDesc::phong(0x4169E1).transparent(0.7);
        assert_eq!(water, MaterialDesc::phong(0x4169E1).transparent(0.7));
        assert_ne!(water, MaterialDesc::phong(0x4169E1));
        assert_ne!(water, MaterialDesc::lambert(0x4169E1).transparent(0.7));
    }

    #[test]
    fn test_material_from_desc() {
        let desc = MaterialDesc::lambert(0xFFFFFF).transparent(0.8);
        let material = Material::from_desc(3, &desc, None);
        assert!(material.transparent);
        assert_eq!(material.rgba(), [1.0, 1.0, 1.0, 0.8]);
        assert!(material.is_lit());
        assert!(!Material::from_desc(4, &MaterialDesc::basic(0), None).is_lit());
    }
}
