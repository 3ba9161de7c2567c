use std::sync::{Arc, Mutex};

use eframe::epaint::textures::TextureOptions;
use egui::load::SizedTexture;
use egui::{ColorImage, ImageSource, Ui};

use engine::render::framebuffer::Framebuffer;
use engine::render::{SCREEN_HEIGHT, SCREEN_WIDTH};

use crate::ui_traits::UiTool;

/// Zoom applied to the panel when the window opens.
const DEFAULT_SCALE: f32 = 4.0;

/// Shows what the simulated panel currently holds.
pub struct PanelDisplay {
    framebuffer: Arc<Mutex<Framebuffer>>,
    texture: Option<egui::TextureHandle>,
}

impl PanelDisplay {
    pub(crate) const fn new(framebuffer: Arc<Mutex<Framebuffer>>) -> Self {
        Self {
            framebuffer,
            texture: None,
        }
    }

    /// Largest size with the panel aspect ratio fitting in `available`.
    #[allow(clippy::cast_precision_loss)]
    fn fit(available: egui::Vec2) -> egui::Vec2 {
        let scale = (available.x / SCREEN_WIDTH as f32)
            .min(available.y / SCREEN_HEIGHT as f32)
            .max(1.0);
        egui::vec2(SCREEN_WIDTH as f32 * scale, SCREEN_HEIGHT as f32 * scale)
    }
}

impl UiTool for PanelDisplay {
    fn name(&self) -> &'static str {
        "Panel"
    }

    #[allow(clippy::cast_precision_loss)]
    fn show(&mut self, ctx: &egui::Context, open: &mut bool) {
        egui::Window::new(self.name())
            .open(open)
            .default_width(SCREEN_WIDTH as f32 * DEFAULT_SCALE)
            .default_height(SCREEN_HEIGHT as f32 * DEFAULT_SCALE)
            .collapsible(false)
            .show(ctx, |ui| {
                self.ui(ui);
            });
    }

    fn ui(&mut self, ui: &mut Ui) {
        // the panel thread holds the lock while blitting, copy out quickly
        let Ok(rgb_data) = self.framebuffer.lock().map(|frame| frame.to_rgb888()) else {
            ui.label("panel unavailable");
            return;
        };

        let image = ColorImage::from_rgb([SCREEN_WIDTH, SCREEN_HEIGHT], &rgb_data);

        if let Some(texture) = &mut self.texture {
            texture.set(image, TextureOptions::NEAREST);
        } else {
            self.texture = Some(ui.ctx().load_texture(
                "panel",
                image,
                TextureOptions::NEAREST,
            ));
        }

        let Some(texture) = &self.texture else {
            return;
        };

        ui.image(ImageSource::Texture(SizedTexture {
            id: texture.id(),
            size: Self::fit(ui.available_size()),
        }));
    }
}
