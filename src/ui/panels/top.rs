use eframe::egui;

use crate::ui::GuiState;

/// Render the header: title, search box, favorites toggle and refresh.
pub fn show(ctx: &egui::Context, state: &mut GuiState) {
    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.heading(format!("🚀 App Multi-Opener v{}", env!("CARGO_PKG_VERSION")));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let loading = state.registry.is_loading();
                if ui
                    .add_enabled(!loading, egui::Button::new("Refresh"))
                    .clicked()
                {
                    state.registry.refresh();
                }

                let heart = if state.favorites_only { "♥ Favorites" } else { "♡ Favorites" };
                ui.toggle_value(&mut state.favorites_only, heart)
                    .on_hover_text("Show favorite applications only");

                let mut filter = state.registry.filter_text().to_string();
                let search = ui.add(
                    egui::TextEdit::singleline(&mut filter)
                        .hint_text("Search name or bundle id")
                        .desired_width(260.0),
                );
                if search.changed() {
                    state.registry.set_filter(filter);
                }
            });
        });
        ui.add_space(6.0);
    });
}
