//! # Graphics Module
//!
//! Everything between placed items and pixels: procedural geometry, cached
//! materials and textures, the scene with its day/night lighting, the camera,
//! ray picking and the render targets.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - Box, sphere, cylinder, cone, plane and ring generators
//! - **Resources** ([`resources`]) - Memoized geometry/material/texture cache and GPU uploads
//! - **Scene** ([`scene`]) - Transforms, mesh groups, lighting and the [`Scene`] itself
//! - **Camera** ([`camera`]) - Fixed perspective camera
//! - **Picking** ([`picking`]) - Pointer rays against the ground plane and bounding boxes
//! - **Rendering** ([`rendering`]) - [`RenderTarget`] trait with a wgpu and a headless target
//!
//! [`Scene`]: scene::Scene
//! [`RenderTarget`]: rendering::RenderTarget

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use rendering::{HeadlessTarget, RenderTarget, WgpuRenderer};
pub use scene::Scene;
