//! # Preview Application
//!
//! Desktop stand-in for the handheld: the panel is simulated on its own
//! thread and the frame loop runs on another, both started here.
//!
//! ## Initialization Flow
//!
//! ```text
//! App::new(fps)
//!     │
//!     ├─► Arc<Mutex<Framebuffer>>      what the panel shows
//!     │
//!     ├─► GameHandle::spawn(framebuffer, fps)
//!     │   ├─► PanelLink::spawn         panel thread
//!     │   └─► game thread              Scene + Game, ticking at fps
//!     │
//!     └─► Create UI tools:
//!         ├─► PanelDisplay (framebuffer texture)
//!         ├─► Controls (run/pause/step, d-pad, stats)
//!         └─► PaletteVisualizer (ramps and tiles)
//! ```
//!
//! Arrow keys are forwarded to the game thread as button presses.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use engine::render::framebuffer::Framebuffer;

use crate::controls::Controls;
use crate::game_thread::{Button, GameCommand, GameHandle};
use crate::palette_visualizer::PaletteVisualizer;
use crate::panel_display::PanelDisplay;
use crate::ui_traits::UiTool;

const KEY_BINDINGS: [(egui::Key, Button); 4] = [
    (egui::Key::ArrowLeft, Button::Left),
    (egui::Key::ArrowRight, Button::Right),
    (egui::Key::ArrowUp, Button::Up),
    (egui::Key::ArrowDown, Button::Down),
];

pub struct App {
    game_handle: Arc<Mutex<GameHandle>>,
    tools: Vec<Box<dyn UiTool>>,
    open: BTreeSet<String>,
}

impl App {
    /// Starts the panel and game threads and builds the tool windows.
    ///
    /// # Errors
    /// Fails if a thread cannot be spawned.
    pub fn new(fps: u32) -> std::io::Result<Self> {
        let framebuffer = Arc::new(Mutex::new(Framebuffer::new()));
        let game_handle = Arc::new(Mutex::new(GameHandle::spawn(
            Arc::clone(&framebuffer),
            fps,
        )?));

        let tools: Vec<Box<dyn UiTool>> = vec![
            Box::new(PanelDisplay::new(framebuffer)),
            Box::new(Controls::new(Arc::clone(&game_handle))),
            Box::<PaletteVisualizer>::default(),
        ];

        Ok(Self::from_tools(game_handle, tools))
    }

    fn from_tools(game_handle: Arc<Mutex<GameHandle>>, tools: Vec<Box<dyn UiTool>>) -> Self {
        let open = tools
            .iter()
            .filter(|tool| tool.open_at_start())
            .map(|tool| tool.name().to_owned())
            .collect();

        Self {
            game_handle,
            tools,
            open,
        }
    }

    pub fn checkboxes(&mut self, ui: &mut egui::Ui) {
        let Self { tools, open, .. } = self;
        for tool in tools {
            let mut is_open = open.contains(tool.name());
            ui.toggle_value(&mut is_open, tool.name());
            set_open(open, tool.name(), is_open);
        }
    }

    fn windows(&mut self, ctx: &egui::Context) {
        let Self { tools, open, .. } = self;
        for tool in tools {
            let mut is_open = open.contains(tool.name());
            tool.show(ctx, &mut is_open);
            set_open(open, tool.name(), is_open);
        }
    }

    /// Forwards arrow key transitions and drains the game events.
    fn sync_game(&self, ctx: &egui::Context) {
        let Ok(mut handle) = self.game_handle.lock() else {
            return;
        };

        for (key, button) in KEY_BINDINGS {
            let (pressed, released) = ctx.input(|i| (i.key_pressed(key), i.key_released(key)));
            if pressed && !handle.state.keypad.is_pressed(button) {
                handle.send(GameCommand::SetKey {
                    button,
                    pressed: true,
                });
            } else if released {
                handle.send(GameCommand::SetKey {
                    button,
                    pressed: false,
                });
            }
        }

        handle.poll();
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        self.sync_game(ctx);

        egui::SidePanel::right("Shading Effect Tools")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Shading Effect");
                });

                ui.separator();

                self.checkboxes(ui);
            });

        self.windows(ctx);
    }
}

fn set_open(open: &mut BTreeSet<String>, key: &'static str, is_open: bool) {
    if is_open {
        if !open.contains(key) {
            open.insert(key.to_owned());
        }
    } else {
        open.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_open_toggles_membership() {
        let mut open = BTreeSet::new();

        set_open(&mut open, "Panel", true);
        set_open(&mut open, "Panel", true);
        assert_eq!(open.len(), 1);

        set_open(&mut open, "Panel", false);
        assert!(open.is_empty());
    }

    #[test]
    fn palette_visualizer_starts_closed() {
        let framebuffer = Arc::new(Mutex::new(Framebuffer::new()));
        let game_handle = Arc::new(Mutex::new(
            GameHandle::spawn(Arc::clone(&framebuffer), 25).unwrap(),
        ));
        let tools: Vec<Box<dyn UiTool>> = vec![
            Box::new(PanelDisplay::new(framebuffer)),
            Box::new(Controls::new(Arc::clone(&game_handle))),
            Box::<PaletteVisualizer>::default(),
        ];

        let app = App::from_tools(game_handle, tools);

        assert_eq!(
            app.open.iter().map(String::as_str).collect::<Vec<_>>(),
            ["Controls", "Panel"]
        );
    }
}
