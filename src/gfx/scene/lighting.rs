//! Ambient light plus the sun and moon directional lights

use cgmath::Vector3;

use crate::config::{LightingConfig, SceneConfig};
use crate::gfx::resources::rgb_from_hex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Directional light shining from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vector3<f32>,
    pub visible: bool,
    pub cast_shadow: bool,
}

impl DirectionalLight {
    fn new(color: u32, intensity: f32, position: [f32; 3], visible: bool) -> Self {
        Self {
            color: rgb_from_hex(color),
            intensity,
            position: Vector3::from(position),
            visible,
            cast_shadow: visible,
        }
    }
}

/// Everything day/night mode switches, captured at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSnapshot {
    pub is_night: bool,
    pub background: [f32; 3],
    pub ambient_intensity: f32,
    pub sun_visible: bool,
    pub moon_visible: bool,
}

#[derive(Debug, Clone)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    pub moon: DirectionalLight,
    pub background: [f32; 3],
    is_night: bool,
    day_background: [f32; 3],
    night_background: [f32; 3],
    ambient_day: f32,
    ambient_night: f32,
}

impl Lighting {
    /// Daytime lighting: sun on, moon off
    pub fn new(scene: &SceneConfig, config: &LightingConfig) -> Self {
        let day_background = rgb_from_hex(scene.background_day);
        Self {
            ambient: AmbientLight {
                color: rgb_from_hex(config.ambient_color),
                intensity: config.ambient_day,
            },
            sun: DirectionalLight::new(
                config.sun_color,
                config.sun_intensity,
                config.sun_position,
                true,
            ),
            moon: DirectionalLight::new(
                config.moon_color,
                config.moon_intensity,
                config.moon_position,
                false,
            ),
            background: day_background,
            is_night: false,
            day_background,
            night_background: rgb_from_hex(scene.background_night),
            ambient_day: config.ambient_day,
            ambient_night: config.ambient_night,
        }
    }

    pub fn is_night(&self) -> bool {
        self.is_night
    }

    /// Switches every mode-dependent value in one step
    pub fn set_night(&mut self, night: bool) {
        let (background, ambient) = if night {
            (self.night_background, self.ambient_night)
        } else {
            (self.day_background, self.ambient_day)
        };

        self.is_night = night;
        self.background = background;
        self.ambient.intensity = ambient;
        self.sun.visible = !night;
        self.moon.visible = night;
    }

    pub fn snapshot(&self) -> LightingSnapshot {
        LightingSnapshot {
            is_night: self.is_night,
            background: self.background,
            ambient_intensity: self.ambient.intensity,
            sun_visible: self.sun.visible,
            moon_visible: self.moon.visible,
        }
    }
}
