//! Pointer input: window pixels to normalized device coordinates and rays
//!
//! The app feeds raw cursor, button and resize events in; listeners receive
//! `click` and `mousemove` with the pointer already in NDC. While disabled,
//! pointer events are dropped but resizes still go through.

use std::fmt;

use cgmath::{Vector2, Vector3};
use winit::event::{ElementState, MouseButton, WindowEvent};

use crate::core::events::{Event, EventBus, ListenerId};
use crate::gfx::camera::PerspectiveCamera;
use crate::gfx::picking::{GroundPlane, Ray};
use crate::items::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEventKind {
    Click,
    MouseMove,
    Resize,
}

impl fmt::Display for InputEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEventKind::Click => f.write_str("click"),
            InputEventKind::MouseMove => f.write_str("mousemove"),
            InputEventKind::Resize => f.write_str("window:resize"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Click { ndc: Vector2<f32> },
    MouseMove { ndc: Vector2<f32> },
    Resize { width: u32, height: u32 },
}

impl Event for InputEvent {
    type Kind = InputEventKind;

    fn kind(&self) -> InputEventKind {
        match self {
            InputEvent::Click { .. } => InputEventKind::Click,
            InputEvent::MouseMove { .. } => InputEventKind::MouseMove,
            InputEvent::Resize { .. } => InputEventKind::Resize,
        }
    }
}

pub struct InputSystem {
    width: u32,
    height: u32,
    pointer: Vector2<f32>,
    enabled: bool,
    events: EventBus<InputEvent>,
}

impl InputSystem {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pointer: Vector2::new(0.0, 0.0),
            enabled: true,
            events: EventBus::new(),
        }
    }

    pub fn on<F>(&mut self, kind: InputEventKind, handler: F) -> ListenerId
    where
        F: FnMut(&InputEvent) -> anyhow::Result<()> + 'static,
    {
        self.events.on(kind, handler)
    }

    pub fn off(&mut self, kind: InputEventKind, id: Option<ListenerId>) -> usize {
        self.events.off(kind, id)
    }

    /// Maps a window pixel position to NDC, with +Y pointing up
    pub fn to_ndc(&self, x: f64, y: f64) -> Vector2<f32> {
        let width = self.width.max(1) as f64;
        let height = self.height.max(1) as f64;
        Vector2::new(
            (x / width * 2.0 - 1.0) as f32,
            (-(y / height) * 2.0 + 1.0) as f32,
        )
    }

    /// Last pointer position in NDC
    pub fn pointer(&self) -> Vector2<f32> {
        self.pointer
    }

    pub fn set_pointer(&mut self, ndc: Vector2<f32>) {
        self.pointer = ndc;
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        if !self.enabled {
            return;
        }
        self.pointer = self.to_ndc(x, y);
        self.events.emit(&InputEvent::MouseMove { ndc: self.pointer });
    }

    /// Emits a click at the last pointer position
    ///
    /// # Returns
    /// The click position, or `None` while disabled
    pub fn click(&mut self) -> Option<Vector2<f32>> {
        if !self.enabled {
            return None;
        }
        self.events.emit(&InputEvent::Click { ndc: self.pointer });
        Some(self.pointer)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.events.emit(&InputEvent::Resize { width, height });
    }

    /// Feeds a winit window event; only cursor, left-button release and
    /// resize are of interest
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(position.x, position.y),
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                self.click();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            _ => {}
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// World-space ray under the pointer
    pub fn ray(&self, camera: &PerspectiveCamera) -> Ray {
        Ray::from_ndc(self.pointer.x, self.pointer.y, camera)
    }

    pub fn raycast_ground(&self, camera: &PerspectiveCamera, ground: &GroundPlane) -> Option<Vector3<f32>> {
        ground.intersect(&self.ray(camera))
    }

    /// Nearest item whose bounding box is under the pointer
    pub fn raycast_items<'a>(&self, camera: &PerspectiveCamera, items: &'a [Item]) -> Option<(&'a Item, f32)> {
        let ray = self.ray(camera);
        items
            .iter()
            .filter_map(|item| {
                let bounds = item.bounding_box()?;
                bounds.intersect_ray(&ray).map(|t| (item, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
