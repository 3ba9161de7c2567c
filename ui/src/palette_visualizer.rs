use egui::Color32;

use engine::render::color::Color;
use engine::render::tiling::{
    BITMAP, BRIGHTNESS_LEVELS, PALETTE, REFERENCE_COLORS, TILE_HEIGHT, TILE_LEN, TILE_WIDTH,
    TRANSPARENT, palette_index,
};

use crate::ui_traits::UiTool;

/// Shows the brightness ramps and the two tiles.
#[derive(Default)]
pub struct PaletteVisualizer {
    /// Level used to paint the tile previews.
    level: usize,
}

fn to_color32(color: Color) -> Color32 {
    let [red, green, blue] = color.to_rgb888();
    Color32::from_rgb(red, green, blue)
}

impl PaletteVisualizer {
    fn ramps(ui: &mut egui::Ui) {
        egui::Grid::new("brightness_ramps")
            .spacing(egui::vec2(1.0, 2.0))
            .show(ui, |ui| {
                for reference_color in 0..REFERENCE_COLORS {
                    ui.label(format!("#{}", reference_color + 1));

                    for level in 0..BRIGHTNESS_LEVELS {
                        let index = palette_index(reference_color, level);
                        let color = Color::from_wire(PALETTE[index]);

                        ui.add(
                            egui::Button::new("")
                                .fill(to_color32(color))
                                .min_size(egui::vec2(10.0, 16.0)),
                        )
                        .on_hover_text(format!(
                            "index {index}, level {level}\nwire 0x{:04x}, rgb {color}",
                            color.0
                        ));
                    }
                    ui.end_row();
                }
            });
    }

    #[allow(clippy::cast_precision_loss)]
    fn tile(&self, ui: &mut egui::Ui, first: usize) {
        let cell = 8.0;
        let (response, painter) = ui.allocate_painter(
            egui::vec2(cell * TILE_WIDTH as f32, cell * TILE_HEIGHT as f32),
            egui::Sense::hover(),
        );
        let origin = response.rect.min;

        for (i, &value) in BITMAP[first..first + TILE_LEN].iter().enumerate() {
            let fill = if value == TRANSPARENT {
                Color32::BLACK
            } else {
                let index = palette_index(usize::from(value - 1), self.level);
                to_color32(Color::from_wire(PALETTE[index]))
            };

            let min = origin + egui::vec2((i % TILE_WIDTH) as f32, (i / TILE_WIDTH) as f32) * cell;
            painter.rect_filled(egui::Rect::from_min_size(min, egui::vec2(cell, cell)), 0.0, fill);
        }
    }
}

impl UiTool for PaletteVisualizer {
    fn name(&self) -> &'static str {
        "Palette Visualizer"
    }

    fn open_at_start(&self) -> bool {
        false
    }

    fn show(&mut self, ctx: &egui::Context, open: &mut bool) {
        egui::Window::new(self.name())
            .default_width(420.0)
            .open(open)
            .show(ctx, |ui| {
                self.ui(ui);
            });
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        ui.label("Brightness ramps, brightest on the left:");
        Self::ramps(ui);

        ui.separator();

        ui.add(egui::Slider::new(&mut self.level, 0..=BRIGHTNESS_LEVELS - 1).text("level"));
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label("Light tile");
                self.tile(ui, 0);
            });
            ui.vertical(|ui| {
                ui.label("Dark tile");
                self.tile(ui, TILE_LEN);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_words_become_egui_colors() {
        assert_eq!(to_color32(Color::BLACK), Color32::BLACK);
        assert_eq!(to_color32(Color(0xffff)), Color32::WHITE);
        // 0x2000 on the wire is RGB565 0x0020: green 1 out of 63
        assert_eq!(to_color32(Color(0x2000)), Color32::from_rgb(0, 4, 0));
    }
}
