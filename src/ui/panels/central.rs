use eframe::egui;

use crate::core::LaunchChain;
use crate::osx::reveal_in_finder;
use crate::style;
use crate::ui::{GuiState, tasks};

/// Render the central panel: batch actions and details of the focused app.
pub fn show(ctx: &egui::Context, state: &mut GuiState, chain: &LaunchChain) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.horizontal(|ui| {
            let n = state.selected.len();
            if ui
                .add_enabled(n > 0, egui::Button::new(format!("Launch selected ({})", n)))
                .clicked()
            {
                tasks::spawn_launch_selected(state, chain);
            }
            if ui
                .add_enabled(n > 0, egui::Button::new("Clear selection"))
                .clicked()
            {
                state.selected.clear();
            }
        });

        ui.add_space(6.0);
        ui.separator();
        ui.add_space(6.0);

        let focused = state
            .focused
            .and_then(|id| state.registry.find(id))
            .cloned();
        let Some(app) = focused else {
            ui.centered_and_justified(|ui| {
                ui.label("Select an application from the left to see details.");
            });
            return;
        };

        ui.horizontal(|ui| {
            if let Some(tex) = state.icon_texture(ctx, &app) {
                ui.add(egui::Image::new((tex.id(), egui::vec2(64.0, 64.0))));
            }
            ui.vertical(|ui| {
                ui.heading(egui::RichText::new(&app.name).strong().size(20.0));
                if let Some(version) = &app.version {
                    ui.label(format!("Version: {}", version));
                }
                let bid = if app.bundle_id.is_empty() {
                    "(none)"
                } else {
                    app.bundle_id.as_str()
                };
                ui.label(format!("Bundle ID: {}", bid));
                ui.label(format!("Path: {}", app.path.display()));
            });
        });

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui
                .add(style::accent_button("▶ Launch new instance"))
                .clicked()
            {
                tasks::spawn_launch(state, chain, app.clone());
            }

            if ui.button("Show in Finder").clicked() {
                if let Err(e) = reveal_in_finder(&app.path) {
                    state.push_status(format!("Cannot reveal in Finder: {:#}", e));
                }
            }

            let is_fav = state.favorites.contains(&app.bundle_id);
            let fav_label = if is_fav { "♥ Unfavorite" } else { "♡ Favorite" };
            if ui
                .add_enabled(!app.bundle_id.is_empty(), egui::Button::new(fav_label))
                .on_disabled_hover_text("Applications without a bundle id cannot be favorites")
                .clicked()
            {
                if let Err(e) = state.favorites.toggle(&app.bundle_id) {
                    log::warn!("Could not save favorites: {:#}", e);
                    state.push_status(format!("Could not save favorites: {:#}", e));
                }
            }
        });
    });
}
