//! Headless model of the garden UI
//!
//! [`UiController`] holds everything the panel shows (tool highlight,
//! day/night label, overlays, toasts, the clear confirmation) and turns
//! button presses into [`UiEvent`]s. The imgui panel only reads and writes
//! through it, so the whole UI flow can be driven from tests.

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::UiConfig;
use crate::core::clock::{system_clock, SharedClock};
use crate::core::events::{Event, EventBus, ListenerId};
use crate::items::{DecorationKind, FlowerKind, FurnitureKind, ItemCategory, ItemKind, TreeKind};
use crate::state::ToolRef;

pub const NIGHT_MODE_LABEL: &str = "🌙 Night Mode";
pub const DAY_MODE_LABEL: &str = "☀️ Day Mode";
pub const CLEAR_GARDEN_TITLE: &str = "Clear Garden";
pub const CLEAR_GARDEN_PROMPT: &str = "Are you sure you want to clear all items?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn color_hex(&self) -> &'static str {
        match self {
            Severity::Info => "#3498db",
            Severity::Success => "#2ecc71",
            Severity::Warning => "#f39c12",
            Severity::Error => "#e74c3c",
        }
    }

    /// Background colour as linear RGBA for imgui
    pub fn color(&self) -> [f32; 4] {
        let hex = u32::from_str_radix(&self.color_hex()[1..], 16).unwrap_or(0);
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        [channel(16), channel(8), channel(0), 1.0]
    }
}

/// One entry of the tool panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub kind: ItemKind,
    pub icon: &'static str,
    pub label: &'static str,
}

pub static TOOL_CATALOG: [Tool; 12] = [
    Tool { kind: ItemKind::Tree(TreeKind::Oak), icon: "🌳", label: "Oak Tree" },
    Tool { kind: ItemKind::Tree(TreeKind::Pine), icon: "🌲", label: "Pine Tree" },
    Tool { kind: ItemKind::Flower(FlowerKind::Rose), icon: "🌹", label: "Rose" },
    Tool { kind: ItemKind::Flower(FlowerKind::Tulip), icon: "🌷", label: "Tulip" },
    Tool { kind: ItemKind::Flower(FlowerKind::Sunflower), icon: "🌻", label: "Sunflower" },
    Tool { kind: ItemKind::Flower(FlowerKind::Lily), icon: "🌸", label: "Lily" },
    Tool { kind: ItemKind::Furniture(FurnitureKind::Bench), icon: "🪑", label: "Bench" },
    Tool { kind: ItemKind::Furniture(FurnitureKind::Table), icon: "🍽️", label: "Table" },
    Tool { kind: ItemKind::Furniture(FurnitureKind::Fountain), icon: "⛲", label: "Fountain" },
    Tool { kind: ItemKind::Decoration(DecorationKind::Lamp), icon: "💡", label: "Lamp" },
    Tool { kind: ItemKind::Decoration(DecorationKind::Stone), icon: "🪨", label: "Stone" },
    Tool { kind: ItemKind::Decoration(DecorationKind::Path), icon: "🟫", label: "Path" },
];

impl Tool {
    pub fn by_category(category: ItemCategory) -> impl Iterator<Item = &'static Tool> {
        TOOL_CATALOG.iter().filter(move |tool| tool.kind.category() == category)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub title: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    ToolSelected,
    ToolCleared,
    DayNightToggle,
    GardenClear,
}

impl fmt::Display for UiEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UiEventKind::ToolSelected => "tool:selected",
            UiEventKind::ToolCleared => "tool:cleared",
            UiEventKind::DayNightToggle => "daynight:toggle",
            UiEventKind::GardenClear => "garden:clear",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ToolSelected(ToolRef),
    ToolCleared,
    DayNightToggle,
    /// Only sent once the user confirmed the dialog
    GardenClear,
}

impl Event for UiEvent {
    type Kind = UiEventKind;

    fn kind(&self) -> UiEventKind {
        match self {
            UiEvent::ToolSelected(_) => UiEventKind::ToolSelected,
            UiEvent::ToolCleared => UiEventKind::ToolCleared,
            UiEvent::DayNightToggle => UiEventKind::DayNightToggle,
            UiEvent::GardenClear => UiEventKind::GardenClear,
        }
    }
}

/// What the game needs from its user interface
pub trait UiAdapter {
    fn on<F>(&mut self, kind: UiEventKind, handler: F) -> ListenerId
    where
        F: FnMut(&UiEvent) -> anyhow::Result<()> + 'static;

    fn show_notification(&mut self, message: &str, severity: Severity);

    fn update_day_night_button(&mut self, is_night: bool);

    /// Highlights `tool` without emitting anything
    fn set_active_tool(&mut self, tool: Option<&ToolRef>);

    /// Drops the highlight and announces `tool:cleared`
    fn clear_selected_tool(&mut self);

    fn show_loading(&mut self);

    fn hide_loading(&mut self);

    fn show_tutorial(&mut self);

    fn hide_tutorial(&mut self);

    /// Per-frame housekeeping such as expiring notifications
    fn update(&mut self) {}

    fn dispose(&mut self) {}
}

pub struct UiController {
    clock: SharedClock,
    notification_duration: Duration,
    active_tool: Option<ItemKind>,
    is_night: bool,
    loading_visible: bool,
    tutorial_visible: bool,
    tool_panel_visible: bool,
    notifications: Vec<Notification>,
    next_notification: u64,
    confirm: Option<ConfirmDialog>,
    events: EventBus<UiEvent>,
}

impl UiController {
    pub fn new(config: &UiConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    pub fn with_clock(config: &UiConfig, clock: SharedClock) -> Self {
        Self {
            clock,
            notification_duration: Duration::from_millis(config.notification_ms),
            active_tool: None,
            is_night: false,
            loading_visible: false,
            tutorial_visible: false,
            tool_panel_visible: true,
            notifications: Vec::new(),
            next_notification: 0,
            confirm: None,
            events: EventBus::new(),
        }
    }

    pub fn off(&mut self, kind: UiEventKind, id: Option<ListenerId>) -> usize {
        self.events.off(kind, id)
    }

    pub fn tools(&self) -> &'static [Tool] {
        &TOOL_CATALOG
    }

    /// Tool button press: highlights it and emits `tool:selected`
    pub fn select_tool(&mut self, kind: ItemKind) {
        self.active_tool = Some(kind);
        self.events.emit(&UiEvent::ToolSelected(ToolRef::from(kind)));
    }

    pub fn active_tool(&self) -> Option<ItemKind> {
        self.active_tool
    }

    pub fn is_tool_active(&self, kind: ItemKind) -> bool {
        self.active_tool == Some(kind)
    }

    /// Day/night button press
    pub fn request_day_night_toggle(&mut self) {
        self.events.emit(&UiEvent::DayNightToggle);
    }

    pub fn day_night_label(&self) -> &'static str {
        if self.is_night {
            DAY_MODE_LABEL
        } else {
            NIGHT_MODE_LABEL
        }
    }

    /// The button is drawn active while it is night
    pub fn is_day_night_active(&self) -> bool {
        self.is_night
    }

    /// "Clear Garden" press: asks for confirmation first
    pub fn request_clear_garden(&mut self) {
        self.confirm = Some(ConfirmDialog {
            title: CLEAR_GARDEN_TITLE,
            message: CLEAR_GARDEN_PROMPT,
        });
    }

    pub fn confirm_dialog(&self) -> Option<&ConfirmDialog> {
        self.confirm.as_ref()
    }

    /// Closes the dialog; `garden:clear` is emitted only when confirmed
    pub fn resolve_confirm(&mut self, confirmed: bool) {
        if self.confirm.take().is_some() && confirmed {
            self.events.emit(&UiEvent::GardenClear);
        }
    }

    pub fn is_loading_visible(&self) -> bool {
        self.loading_visible
    }

    pub fn is_tutorial_visible(&self) -> bool {
        self.tutorial_visible
    }

    pub fn set_tool_panel_visible(&mut self, visible: bool) {
        self.tool_panel_visible = visible;
    }

    pub fn is_tool_panel_visible(&self) -> bool {
        self.tool_panel_visible
    }

    pub fn show_notification_for(&mut self, message: &str, severity: Severity, duration: Duration) -> u64 {
        self.next_notification += 1;
        self.notifications.push(Notification {
            id: self.next_notification,
            message: message.to_string(),
            severity,
            expires_at: self.clock.now() + duration,
        });
        self.next_notification
    }

    /// Notifications that have not expired yet, oldest first
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        before != self.notifications.len()
    }

    /// # Returns
    /// Number of notifications removed
    pub fn expire_notifications(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.notifications.len();
        self.notifications.retain(|n| n.expires_at > now);
        before - self.notifications.len()
    }
}

impl UiAdapter for UiController {
    fn on<F>(&mut self, kind: UiEventKind, handler: F) -> ListenerId
    where
        F: FnMut(&UiEvent) -> anyhow::Result<()> + 'static,
    {
        self.events.on(kind, handler)
    }

    fn show_notification(&mut self, message: &str, severity: Severity) {
        log::debug!("Notification ({:?}): {}", severity, message);
        self.show_notification_for(message, severity, self.notification_duration);
    }

    fn update_day_night_button(&mut self, is_night: bool) {
        self.is_night = is_night;
    }

    fn set_active_tool(&mut self, tool: Option<&ToolRef>) {
        self.active_tool = tool.and_then(|tool| tool.kind().ok());
    }

    fn clear_selected_tool(&mut self) {
        self.active_tool = None;
        self.events.emit(&UiEvent::ToolCleared);
    }

    fn show_loading(&mut self) {
        self.loading_visible = true;
    }

    fn hide_loading(&mut self) {
        self.loading_visible = false;
    }

    fn show_tutorial(&mut self) {
        self.tutorial_visible = true;
    }

    fn hide_tutorial(&mut self) {
        self.tutorial_visible = false;
    }

    fn update(&mut self) {
        self.expire_notifications();
    }

    fn dispose(&mut self) {
        self.events.clear();
        self.notifications.clear();
        self.confirm = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn controller() -> (UiController, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let ui = UiController::with_clock(&UiConfig::default(), clock.clone());
        (ui, clock)
    }

    fn record(ui: &mut UiController) -> Rc<RefCell<Vec<UiEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            UiEventKind::ToolSelected,
            UiEventKind::ToolCleared,
            UiEventKind::DayNightToggle,
            UiEventKind::GardenClear,
        ] {
            let log = Rc::clone(&log);
            ui.on(kind, move |event| {
                log.borrow_mut().push(event.clone());
                Ok(())
            });
        }
        log
    }

    #[test]
    fn test_catalog_covers_every_kind_once() {
        for kind in ItemKind::ALL {
            assert_eq!(TOOL_CATALOG.iter().filter(|t| t.kind == kind).count(), 1);
        }
        assert_eq!(Tool::by_category(ItemCategory::Flower).count(), 4);
    }

    #[test]
    fn test_tool_selection_highlights_and_emits() {
        let (mut ui, _) = controller();
        let log = record(&mut ui);

        ui.select_tool(ItemKind::Tree(TreeKind::Oak));
        ui.select_tool(ItemKind::Flower(FlowerKind::Lily));
        assert!(ui.is_tool_active(ItemKind::Flower(FlowerKind::Lily)));
        assert!(!ui.is_tool_active(ItemKind::Tree(TreeKind::Oak)));

        ui.clear_selected_tool();
        assert_eq!(ui.active_tool(), None);
        assert_eq!(
            *log.borrow(),
            vec![
                UiEvent::ToolSelected(ToolRef::new(ItemCategory::Tree, "oak")),
                UiEvent::ToolSelected(ToolRef::new(ItemCategory::Flower, "lily")),
                UiEvent::ToolCleared,
            ]
        );
    }

    #[test]
    fn test_day_night_label_follows_mode() {
        let (mut ui, _) = controller();
        assert_eq!(ui.day_night_label(), "🌙 Night Mode");
        ui.update_day_night_button(true);
        assert_eq!(ui.day_night_label(), "☀️ Day Mode");
        assert!(ui.is_day_night_active());
        ui.update_day_night_button(false);
        assert_eq!(ui.day_night_label(), "🌙 Night Mode");
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let (mut ui, _) = controller();
        let log = record(&mut ui);

        ui.request_clear_garden();
        assert_eq!(ui.confirm_dialog().unwrap().message, "Are you sure you want to clear all items?");
        ui.resolve_confirm(false);
        assert!(ui.confirm_dialog().is_none());
        assert!(log.borrow().is_empty());

        ui.request_clear_garden();
        ui.resolve_confirm(true);
        // a stray second answer does nothing
        ui.resolve_confirm(true);
        assert_eq!(*log.borrow(), vec![UiEvent::GardenClear]);
    }

    #[test]
    fn test_notifications_expire() {
        let (mut ui, clock) = controller();
        ui.show_notification("Garden cleared!", Severity::Success);
        clock.advance_ms(1000);
        ui.show_notification_for("short", Severity::Info, Duration::from_millis(500));
        assert_eq!(ui.notifications().len(), 2);

        clock.advance_ms(600);
        ui.update();
        assert_eq!(ui.notifications().len(), 1);
        assert_eq!(ui.notifications()[0].message, "Garden cleared!");

        clock.advance_ms(1400);
        ui.update();
        assert!(ui.notifications().is_empty());
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(Severity::Warning.color_hex(), "#f39c12");
        let [r, g, b, a] = Severity::Error.color();
        assert!((r - 0xe7 as f32 / 255.0).abs() < 1e-6);
        assert!((g - 0x4c as f32 / 255.0).abs() < 1e-6);
        assert!((b - 0x3c as f32 / 255.0).abs() < 1e-6);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn test_set_active_tool_is_silent() {
        let (mut ui, _) = controller();
        let log = record(&mut ui);
        ui.set_active_tool(Some(&ToolRef::new(ItemCategory::Decoration, "lamp")));
        assert!(ui.is_tool_active(ItemKind::Decoration(DecorationKind::Lamp)));
        assert!(log.borrow().is_empty());
    }
}
