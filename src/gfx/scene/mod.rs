//! # Scene Module
//!
//! Node data (transforms, mesh groups, point lights), the day/night lighting
//! rig and the [`Scene`] that turns all of it into frames.
//!
//! ## Key Components
//!
//! - [`Scene`] - Camera, lighting, static objects and the render target
//! - [`Group`] - Mesh parts and point lights drawn with one world matrix
//! - [`Transform`] - Position, Euler rotation and scale, animatable per channel
//! - [`Vertex3D`] / [`InstanceRaw`] - GPU vertex layouts
//!
//! ## Usage
//!
//! ```rust
//! use garden_designer::config::{LightingConfig, SceneConfig};
//! use garden_designer::gfx::rendering::HeadlessTarget;
//! use garden_designer::gfx::scene::Scene;
//!
//! let mut scene = Scene::new(
//!     &SceneConfig::default(),
//!     &LightingConfig::default(),
//!     HeadlessTarget::new(800, 600),
//! );
//! assert!(scene.toggle_day_night());
//! scene.render(std::iter::empty()).unwrap();
//! ```

pub mod lighting;
pub mod object;
pub mod scene;
pub mod transform;
pub mod vertex;

pub use lighting::{Lighting, LightingSnapshot};
pub use object::{Group, MeshPart, PointLight};
pub use scene::{ObjectId, Scene, SceneEvent, SceneEventKind, SceneObject};
pub use transform::Transform;
pub use vertex::{InstanceRaw, Vertex3D};
