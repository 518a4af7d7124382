use eframe::egui;

use crate::style;
use crate::ui::{GuiState, list};

use egui::Vec2;

/// Render the left sidebar with the filtered apps list.
pub fn show(ctx: &egui::Context, state: &mut GuiState) {
    egui::SidePanel::left("sidebar")
        .resizable(false)
        .exact_width(320.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.set_height(32.0);
                ui.label(egui::RichText::new("APPLICATIONS").strong().size(16.0));
                if state.registry.is_loading() {
                    ui.spinner();
                }
            });
            ui.separator();

            let apps = state.visible_apps();
            if apps.is_empty() && !state.registry.is_loading() {
                ui.label("No applications match.");
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for app in &apps {
                        let tex = state.icon_texture(ctx, app);
                        let badge = if state.favorites.contains(&app.bundle_id) {
                            Some("♥")
                        } else {
                            None
                        };
                        ui.horizontal(|ui| {
                            let mut checked = state.selected.contains(&app.id);
                            if ui
                                .checkbox(&mut checked, "")
                                .on_hover_text("Select for batch launch")
                                .changed()
                            {
                                if checked {
                                    state.selected.insert(app.id);
                                } else {
                                    state.selected.remove(&app.id);
                                }
                            }

                            let full_width = ui.available_width();
                            let resp = list::app_row(
                                ui,
                                &app.name,
                                tex.as_ref(),
                                badge,
                                Vec2::new(full_width, 26.0),
                                state.focused == Some(app.id),
                                style::row_colors(),
                            );
                            if resp.clicked() {
                                state.focused = Some(app.id);
                            }
                        });
                    }
                });
        });
}
