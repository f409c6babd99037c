//! imgui panels for the garden designer
//!
//! Everything here is drawn from a [`UiController`]; button presses go back
//! through it, never straight to the game.

use imgui::{Condition, StyleColor, WindowFlags};

use super::controller::UiController;
use crate::items::ItemCategory;

const PANEL_WIDTH: f32 = 240.0;
const TOAST_WIDTH: f32 = 320.0;

/// Draws the full garden UI for one frame
///
/// # Arguments
/// * `ui` - ImGui frame
/// * `controller` - UI model; button presses are forwarded to it
pub fn garden_panel(ui: &imgui::Ui, controller: &mut UiController) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    if controller.is_loading_visible() {
        render_loading_overlay(ui, display_size);
        return;
    }

    if controller.is_tool_panel_visible() {
        render_tool_panel(ui, controller, display_size);
    }
    if controller.is_tutorial_visible() {
        render_tutorial(ui, display_size);
    }
    render_confirm_dialog(ui, controller, display_size);
    render_notifications(ui, controller, display_size);
}

fn render_tool_panel(ui: &imgui::Ui, controller: &mut UiController, display_size: [f32; 2]) {
    ui.window("Garden Tools")
        .position([20.0, 20.0], Condition::FirstUseEver)
        .size([PANEL_WIDTH, display_size[1] * 0.8], Condition::FirstUseEver)
        .collapsible(true)
        .resizable(false)
        .build(|| {
            for category in ItemCategory::ALL {
                render_category(ui, controller, category);
            }

            ui.separator();
            ui.spacing();

            let night_color = controller
                .is_day_night_active()
                .then(|| ui.push_style_color(StyleColor::Button, [0.1, 0.1, 0.44, 1.0]));
            if ui.button_with_size(controller.day_night_label(), [-1.0, 0.0]) {
                controller.request_day_night_toggle();
            }
            drop(night_color);

            if ui.button_with_size("Clear Garden", [-1.0, 0.0]) {
                controller.request_clear_garden();
            }
        });
}

fn render_category(ui: &imgui::Ui, controller: &mut UiController, category: ItemCategory) {
    let title = match category {
        ItemCategory::Tree => "Trees",
        ItemCategory::Flower => "Flowers",
        ItemCategory::Furniture => "Furniture",
        ItemCategory::Decoration => "Decorations",
    };
    if !ui.collapsing_header(title, imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }

    let tools: Vec<_> = super::controller::Tool::by_category(category).collect();
    for tool in tools {
        let selected = controller.is_tool_active(tool.kind);
        if ui
            .selectable_config(tool.label)
            .selected(selected)
            .allow_double_click(false)
            .build()
        {
            controller.select_tool(tool.kind);
        }
    }
    ui.spacing();
}

fn render_confirm_dialog(ui: &imgui::Ui, controller: &mut UiController, display_size: [f32; 2]) {
    let Some(dialog) = controller.confirm_dialog().copied() else {
        return;
    };

    let mut answer = None;
    ui.window(dialog.title)
        .position([display_size[0] * 0.5, display_size[1] * 0.5], Condition::Always)
        .position_pivot([0.5, 0.5])
        .flags(WindowFlags::NO_COLLAPSE | WindowFlags::NO_RESIZE | WindowFlags::ALWAYS_AUTO_RESIZE)
        .build(|| {
            ui.text(dialog.message);
            ui.spacing();
            if ui.button("OK") {
                answer = Some(true);
            }
            ui.same_line();
            if ui.button("Cancel") {
                answer = Some(false);
            }
        });

    if let Some(confirmed) = answer {
        controller.resolve_confirm(confirmed);
    }
}

fn render_loading_overlay(ui: &imgui::Ui, display_size: [f32; 2]) {
    ui.window("##loading")
        .position([display_size[0] * 0.5, display_size[1] * 0.5], Condition::Always)
        .position_pivot([0.5, 0.5])
        .flags(WindowFlags::NO_DECORATION | WindowFlags::ALWAYS_AUTO_RESIZE | WindowFlags::NO_MOVE)
        .build(|| {
            ui.text("Loading garden...");
        });
}

fn render_tutorial(ui: &imgui::Ui, display_size: [f32; 2]) {
    ui.window("How to play")
        .position([display_size[0] * 0.5, display_size[1] - 20.0], Condition::Always)
        .position_pivot([0.5, 1.0])
        .flags(WindowFlags::NO_DECORATION | WindowFlags::ALWAYS_AUTO_RESIZE | WindowFlags::NO_MOVE)
        .bg_alpha(0.8)
        .build(|| {
            ui.text("1. Pick an item from the Garden Tools panel");
            ui.text("2. Click on the grass to place it");
            ui.text("3. Toggle night mode to light up the lamps");
        });
}

fn render_notifications(ui: &imgui::Ui, controller: &UiController, display_size: [f32; 2]) {
    let mut y = 20.0;
    for notification in controller.notifications() {
        let _bg = ui.push_style_color(StyleColor::WindowBg, notification.severity.color());
        ui.window(format!("##notification{}", notification.id))
            .position([display_size[0] - 20.0, y], Condition::Always)
            .position_pivot([1.0, 0.0])
            .size([TOAST_WIDTH, 0.0], Condition::Always)
            .flags(
                WindowFlags::NO_DECORATION
                    | WindowFlags::NO_MOVE
                    | WindowFlags::NO_INPUTS
                    | WindowFlags::NO_FOCUS_ON_APPEARING,
            )
            .build(|| {
                ui.text_wrapped(&notification.message);
            });
        y += 48.0;
    }
}

/// Blocking startup error with a reload button
///
/// # Returns
/// True when the user asked to reload
pub fn error_screen(ui: &imgui::Ui, message: &str) -> bool {
    let display_size = ui.io().display_size;
    let mut reload = false;

    let _bg = ui.push_style_color(StyleColor::WindowBg, [0.91, 0.3, 0.24, 0.9]);
    ui.window("Error")
        .position([display_size[0] * 0.5, display_size[1] * 0.5], Condition::Always)
        .position_pivot([0.5, 0.5])
        .flags(WindowFlags::NO_COLLAPSE | WindowFlags::NO_MOVE | WindowFlags::ALWAYS_AUTO_RESIZE)
        .build(|| {
            ui.text(message);
            ui.spacing();
            reload = ui.button("Reload");
        });
    reload
}
