//! Light theme and the palette shared by the app list and action buttons.

use eframe::egui::{self, Button, Color32, RichText, Stroke, Visuals};

use crate::types::StateColors;

/// Highlight for the focused row, selections and the primary action.
pub const ACCENT: Color32 = Color32::from_rgb(58, 128, 246);
pub const ROW_FILL: Color32 = Color32::from_rgb(247, 248, 250);
pub const ROW_HOVER: Color32 = Color32::WHITE;
const WINDOW_FILL: Color32 = Color32::from_rgb(236, 236, 236);
const WIDGET_HOVER: Color32 = Color32::from_rgb(245, 245, 247);

/// Row colours for the application list.
pub fn row_colors() -> StateColors {
    StateColors {
        default: ROW_FILL,
        hover: ROW_HOVER,
        selected: Some(ACCENT),
    }
}

/// Filled button in the accent colour, for the main action of a panel.
pub fn accent_button(text: &str) -> Button<'static> {
    Button::new(RichText::new(text.to_owned()).color(Color32::WHITE)).fill(ACCENT)
}

fn visuals() -> Visuals {
    let mut visuals = Visuals::light();
    visuals.window_fill = WINDOW_FILL;
    visuals.panel_fill = Color32::WHITE;
    visuals.selection.bg_fill = ACCENT;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.widgets.hovered.bg_fill = WIDGET_HOVER;
    visuals
}

/// Install the theme and spacing. Called every frame; egui skips unchanged styles.
pub fn set_appkit_style(ctx: &egui::Context) {
    ctx.set_visuals(visuals());
    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(8.0, 4.0);
        style.spacing.button_padding = egui::vec2(10.0, 4.0);
    });
}
