//! Controls
//!
//! Run/pause/step buttons, an on-screen d-pad mirroring the arrow keys and
//! the statistics of the last frame.

use std::sync::{Arc, Mutex};

use engine::input::Keypad;

use crate::game_thread::{Button, GameCommand, GameHandle, GameState};
use crate::ui_traits::UiTool;

pub struct Controls {
    game_handle: Arc<Mutex<GameHandle>>,
    steps: u32,
}

impl Controls {
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(game_handle: Arc<Mutex<GameHandle>>) -> Self {
        Self {
            game_handle,
            steps: 1,
        }
    }

    fn send(&self, cmd: GameCommand) {
        if let Ok(mut handle) = self.game_handle.lock() {
            handle.send(cmd);
        }
    }

    /// D-pad button: lit while held, click to toggle.
    fn btn(&self, ui: &mut egui::Ui, label: &str, button: Button, keypad: Keypad) {
        let pressed = keypad.is_pressed(button);
        let text = egui::RichText::new(label).color(if pressed {
            egui::Color32::WHITE
        } else {
            egui::Color32::GRAY
        });

        let bg = if pressed {
            egui::Color32::from_rgb(0, 120, 215)
        } else {
            egui::Color32::from_rgb(50, 50, 50)
        };

        if ui
            .add(
                egui::Button::new(text)
                    .fill(bg)
                    .min_size(egui::vec2(28.0, 22.0)),
            )
            .clicked()
        {
            self.send(GameCommand::SetKey {
                button,
                pressed: !pressed,
            });
        }
    }

    fn dpad(&self, ui: &mut egui::Ui, keypad: Keypad) {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.add_space(32.0);
                self.btn(ui, "^", Button::Up, keypad);
            });
            ui.horizontal(|ui| {
                self.btn(ui, "<", Button::Left, keypad);
                ui.add_space(4.0);
                self.btn(ui, ">", Button::Right, keypad);
            });
            ui.horizontal(|ui| {
                ui.add_space(32.0);
                self.btn(ui, "v", Button::Down, keypad);
            });
        });
    }

    fn playback(&mut self, ui: &mut egui::Ui, state: &GameState) {
        let stopped = state.error.is_some();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!state.is_running && !stopped, egui::Button::new("▶"))
                .clicked()
            {
                self.send(GameCommand::Run);
            }

            if ui
                .add_enabled(state.is_running && !stopped, egui::Button::new("⏸ "))
                .clicked()
            {
                self.send(GameCommand::Pause);
            }

            ui.separator();

            ui.add(egui::DragValue::new(&mut self.steps).range(1..=1000));
            if ui
                .add_enabled(!state.is_running && !stopped, egui::Button::new("Step"))
                .clicked()
            {
                self.send(GameCommand::Step(self.steps));
            }
        });
    }
}

fn stats(ui: &mut egui::Ui, state: &GameState) {
    if let Some(error) = state.error {
        ui.colored_label(egui::Color32::RED, format!("stopped: {error}"));
    }

    let Some(last) = state.last_frame else {
        ui.label("no frame yet");
        return;
    };
    let report = last.report;

    egui::Grid::new("frame_stats")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            ui.label("Frame");
            ui.monospace(report.frame.to_string());
            ui.end_row();

            ui.label("Offset");
            ui.monospace(format!("({}, {})", report.offset.x, report.offset.y));
            ui.end_row();

            ui.label("Velocity");
            ui.monospace(format!("({:.2}, {:.2})", report.velocity.0, report.velocity.1));
            ui.end_row();

            ui.label("Render");
            ui.monospace(format!("{:.2} ms", report.render_time.as_secs_f64() * 1000.0));
            ui.end_row();

            ui.label("FPS");
            let frame_time = last.frame_time.as_secs_f64();
            if frame_time > 0.0 {
                ui.monospace(format!("{:.1}", 1.0 / frame_time));
            } else {
                ui.monospace("-");
            }
            ui.end_row();
        });
}

impl UiTool for Controls {
    fn name(&self) -> &'static str {
        "Controls"
    }

    fn show(&mut self, ctx: &egui::Context, open: &mut bool) {
        egui::Window::new(self.name())
            .default_width(220.0)
            .open(open)
            .show(ctx, |ui| {
                self.ui(ui);
            });
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        let Some(state) = self
            .game_handle
            .lock()
            .ok()
            .map(|handle| handle.state.clone())
        else {
            ui.label("game thread unavailable");
            return;
        };

        self.playback(ui, &state);

        ui.separator();
        ui.small("Arrow keys or click to toggle");
        self.dpad(ui, state.keypad);

        ui.separator();
        stats(ui, &state);
    }
}
