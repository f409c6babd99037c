//! Tunable constants for the scene, garden, items and UI
//!
//! Every section has a `Default` holding the stock values, so a config file
//! only needs to name the fields it changes:
//!
//! ```
//! use garden_designer::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "garden": { "boundary": 7.5 } }"#).unwrap();
//! assert_eq!(config.garden.boundary, 7.5);
//! assert_eq!(config.garden.size, 20.0);
//! ```

use serde::Deserialize;

use crate::error::Result;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub scene: SceneConfig,
    pub lighting: LightingConfig,
    pub garden: GardenConfig,
    pub items: ItemConfig,
    pub ui: UiConfig,
    pub state: StateConfig,
}

impl GameConfig {
    /// Overlays a (possibly partial) JSON document on the defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Camera and background
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background_day: u32,
    pub background_night: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background_day: 0x87CEEB,
            background_night: 0x191970,
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_position: [0.0, 8.0, 12.0],
            camera_target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: u32,
    pub ambient_day: f32,
    pub ambient_night: f32,
    pub sun_color: u32,
    pub sun_intensity: f32,
    pub sun_position: [f32; 3],
    pub moon_color: u32,
    pub moon_intensity: f32,
    pub moon_position: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: 0x404040,
            ambient_day: 0.4,
            ambient_night: 0.2,
            sun_color: 0xFFFFFF,
            sun_intensity: 1.2,
            sun_position: [10.0, 10.0, 5.0],
            moon_color: 0x9999FF,
            moon_intensity: 0.3,
            moon_position: [-10.0, 10.0, -5.0],
        }
    }
}

/// Ground plane and placement boundary
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Edge length of the square ground plane
    pub size: f32,
    /// Half extent of the placeable square, inclusive
    pub boundary: f32,
    pub ground_color: u32,
    pub border_color: u32,
    pub texture_repeat: f32,
    pub border_inner_radius: f32,
    pub border_outer_radius: f32,
    pub border_segments: u32,
    pub border_height: f32,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            size: 20.0,
            boundary: 9.0,
            ground_color: 0x4A904A,
            border_color: 0x8B4513,
            texture_repeat: 4.0,
            border_inner_radius: 10.0,
            border_outer_radius: 10.2,
            border_segments: 32,
            border_height: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub tree_color: u32,
    pub flower_color: u32,
    pub furniture_color: u32,
    pub decoration_color: u32,
    /// Spawn animation length in milliseconds
    pub spawn_duration_ms: u64,
    pub spawn_start_scale: f32,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            tree_color: 0x228B22,
            flower_color: 0xFF69B4,
            furniture_color: 0x8B4513,
            decoration_color: 0x696969,
            spawn_duration_ms: 500,
            spawn_start_scale: 0.1,
        }
    }
}

/// Durations in milliseconds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tutorial_ms: u64,
    pub loading_ms: u64,
    pub animation_ms: u64,
    pub notification_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tutorial_ms: 8000,
            loading_ms: 2000,
            animation_ms: 300,
            notification_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub history_capacity: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
        }
    }
}
