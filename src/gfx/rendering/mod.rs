//! Core rendering functionality
//!
//! [`Frame`] is the renderer-independent description of what to draw;
//! [`WgpuRenderer`] draws it on screen and [`HeadlessTarget`] records it.

pub mod renderer;
pub mod target;

pub use renderer::WgpuRenderer;
pub use target::{
    DirectionalLightData, DrawCall, Frame, FrameSummary, HeadlessTarget, PointLightData,
    RenderTarget,
};
