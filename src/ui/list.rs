use crate::types::StateColors;
use eframe::emath::{Align2, Rect, Vec2, pos2};
use eframe::epaint::{Color32, FontId, StrokeKind};
use egui::{Response, Sense, TextureHandle, Ui};

const ICON_SIDE: f32 = 20.0;

/// One clickable application row: optional icon, name, and a trailing badge.
pub fn app_row(
    ui: &mut Ui,
    text: &str,
    icon: Option<&TextureHandle>,
    badge: Option<&str>,
    size: Vec2,
    selected: bool,
    colors: StateColors,
) -> Response {
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());

    if ui.is_rect_visible(rect) {
        let mut visuals = ui.style().interact_selectable(&response, selected);

        let bg_color = if selected {
            colors.selected.unwrap_or(visuals.bg_fill)
        } else if response.hovered() {
            colors.hover
        } else {
            colors.default
        };
        visuals.bg_fill = bg_color;

        let border_radius = 2.0;
        ui.painter()
            .rect_filled(rect, border_radius, visuals.bg_fill);
        ui.painter()
            .rect_stroke(rect, border_radius, visuals.bg_stroke, StrokeKind::Middle);

        let mut text_left = rect.left() + 8.0;
        if let Some(tex) = icon {
            let icon_rect = Rect::from_center_size(
                pos2(text_left + ICON_SIDE / 2.0, rect.center().y),
                Vec2::splat(ICON_SIDE),
            );
            ui.painter().image(
                tex.id(),
                icon_rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        text_left += ICON_SIDE + 6.0;

        ui.painter().text(
            pos2(text_left, rect.center().y),
            Align2::LEFT_CENTER,
            text,
            FontId::default(),
            visuals.text_color(),
        );

        if let Some(badge) = badge {
            ui.painter().text(
                rect.right_center() - Vec2::new(8.0, 0.0),
                Align2::RIGHT_CENTER,
                badge,
                FontId::default(),
                visuals.text_color(),
            );
        }
    }

    response
}
