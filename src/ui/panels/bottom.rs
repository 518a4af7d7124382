use eframe::egui;

use crate::ui::GuiState;

/// Compact status bar: counts, activity and the latest message.
pub fn show(ctx: &egui::Context, state: &GuiState) {
    egui::TopBottomPanel::bottom("bottom_status")
        .resizable(false)
        .default_height(24.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if state.registry.is_loading() || state.launches_in_flight > 0 {
                    ui.spinner();
                }
                ui.label(
                    egui::RichText::new(format!(
                        "Applications: {}  •  Shown: {}  •  Favorites: {}  •  Selected: {}",
                        state.registry.applications().len(),
                        state.visible_apps().len(),
                        state.favorites.len(),
                        state.selected.len(),
                    ))
                    .color(egui::Color32::BLACK)
                    .monospace(),
                );
                if let Some(last) = state.status_msgs.last() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(last).weak());
                    });
                }
            });
        });
}
