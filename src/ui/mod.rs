//! # User Interface Module
//!
//! The garden's tool panel, day/night and clear buttons, confirmation dialog,
//! notification toasts, loading overlay and tutorial.
//!
//! ## Architecture
//!
//! UI state lives in a [`UiController`] that owns no graphics at all, so the
//! game can drive it (and tests can inspect it) without a window. The game only
//! sees it through the [`UiAdapter`] trait. Each frame [`panel::garden_panel`]
//! draws the controller with Dear ImGui through the [`UiManager`], and button
//! presses come back as [`UiEvent`]s.
//!
//! ## Key Components
//!
//! - [`UiController`] - Selected tool, notifications, overlays and the clear dialog
//! - [`UiAdapter`] - What the game needs from a user interface
//! - [`UiManager`] - ImGui context, winit platform glue and wgpu renderer
//! - [`panel`] - ImGui drawing of the controller and the startup error screen
//!
//! ## Usage
//!
//! ```rust
//! use garden_designer::config::UiConfig;
//! use garden_designer::items::{ItemKind, TreeKind};
//! use garden_designer::ui::{UiAdapter, UiController, UiEventKind};
//!
//! let mut ui = UiController::new(&UiConfig::default());
//! ui.on(UiEventKind::ToolSelected, |event| {
//!     println!("selected {:?}", event);
//!     Ok(())
//! });
//! ui.select_tool(ItemKind::Tree(TreeKind::Oak));
//! assert!(ui.is_tool_active(ItemKind::Tree(TreeKind::Oak)));
//! ```

pub mod controller;
pub mod manager;
pub mod panel;

pub use controller::{
    ConfirmDialog, Notification, Severity, Tool, UiAdapter, UiController, UiEvent, UiEventKind,
    DAY_MODE_LABEL, NIGHT_MODE_LABEL, TOOL_CATALOG,
};
pub use manager::UiManager;
pub use panel::{error_screen, garden_panel};
