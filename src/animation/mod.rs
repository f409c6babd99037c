//! # Animation
//!
//! Tween scheduling for item transforms.
//!
//! ## Usage
//!
//! ```
//! use garden_designer::animation::{AnimationSystem, AnimateOptions, EndValues, Easing};
//! use garden_designer::gfx::scene::Transform;
//! use std::collections::HashMap;
//!
//! let mut targets = HashMap::new();
//! targets.insert(1u32, Transform::default());
//!
//! let mut animations = AnimationSystem::new();
//! animations.animate(
//!     1u32,
//!     EndValues::new().uniform_scale(2.0),
//!     AnimateOptions::default().duration_ms(300).easing(Easing::QuadInOut),
//! );
//!
//! // once per frame
//! animations.update(&mut targets);
//! ```

pub mod easing;
pub mod system;

pub use easing::{Easing, BACK_OVERSHOOT};
pub use system::{
    AnimateOptions, Animatable, AnimationSystem, Channel, EndValues, TweenHandle, TweenState,
    TweenTargets,
};
