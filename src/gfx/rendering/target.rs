//! Render target abstraction
//!
//! The scene flattens itself into a [`Frame`] of draw calls and lights and
//! hands it to a [`RenderTarget`]. [`WgpuRenderer`](super::WgpuRenderer) puts
//! it on screen; [`HeadlessTarget`] only records what it was given, which lets
//! the whole game run without a window.

use cgmath::Matrix4;

use crate::error::Result;
use crate::gfx::camera::CameraUniform;
use crate::gfx::resources::{Geometry, Material};
use crate::gfx::scene::lighting::{DirectionalLight, Lighting};
use crate::gfx::scene::object::{light_world_position, Group};

pub trait RenderTarget {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()>;
    fn resize(&mut self, width: u32, height: u32);
    fn size(&self) -> (u32, u32);
}

/// One mesh part with its resolved world matrix
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub geometry: &'a Geometry,
    pub material: &'a Material,
    pub model: Matrix4<f32>,
    pub emissive: [f32; 3],
}

/// Light direction (towards the light) and intensity-scaled color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightData {
    pub direction: [f32; 3],
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightData {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub range: f32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub clear_color: [f32; 3],
    pub camera: CameraUniform,
    pub ambient: [f32; 3],
    pub directional: Vec<DirectionalLightData>,
    pub point_lights: Vec<PointLightData>,
    pub draws: Vec<DrawCall<'a>>,
}

impl<'a> Frame<'a> {
    pub fn new(camera: CameraUniform, lighting: &Lighting) -> Self {
        let scaled = |color: [f32; 3], intensity: f32| color.map(|c| c * intensity);
        let directional = [lighting.sun, lighting.moon]
            .into_iter()
            .filter(|light| light.visible)
            .map(|light: DirectionalLight| {
                let len = (light.position.x * light.position.x
                    + light.position.y * light.position.y
                    + light.position.z * light.position.z)
                    .sqrt()
                    .max(f32::EPSILON);
                DirectionalLightData {
                    direction: (light.position / len).into(),
                    color: scaled(light.color, light.intensity),
                }
            })
            .collect();

        Self {
            clear_color: lighting.background,
            camera,
            ambient: scaled(lighting.ambient.color, lighting.ambient.intensity),
            directional,
            point_lights: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// Adds every part and visible light of `group` placed at `world`
    pub fn push_group(&mut self, group: &'a Group, world: Matrix4<f32>) {
        for part in &group.parts {
            self.draws.push(DrawCall {
                geometry: &part.geometry,
                material: &part.material,
                model: world * part.local,
                emissive: part.emissive_color(),
            });
        }
        for light in group.lights.iter().filter(|l| l.visible) {
            self.point_lights.push(PointLightData {
                position: light_world_position(&world, light).into(),
                color: light.color.map(|c| c * light.intensity),
                range: light.range,
            });
        }
    }

    pub fn transparent_draws(&self) -> usize {
        self.draws.iter().filter(|d| d.material.transparent).count()
    }
}

/// What a headless target saw in its latest frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub clear_color: [f32; 3],
    pub ambient: [f32; 3],
    pub directional_lights: usize,
    pub point_lights: usize,
    pub draw_calls: usize,
    pub transparent_draws: usize,
}

/// Offscreen target that records frame summaries instead of drawing
#[derive(Debug, Clone)]
pub struct HeadlessTarget {
    width: u32,
    height: u32,
    frames: u64,
    last: Option<FrameSummary>,
}

impl HeadlessTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: 0,
            last: None,
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameSummary> {
        self.last.as_ref()
    }
}

impl RenderTarget for HeadlessTarget {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.frames += 1;
        self.last = Some(FrameSummary {
            clear_color: frame.clear_color,
            ambient: frame.ambient,
            directional_lights: frame.directional.len(),
            point_lights: frame.point_lights.len(),
            draw_calls: frame.draws.len(),
            transparent_draws: frame.transparent_draws(),
        });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
