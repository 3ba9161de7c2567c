pub mod app;
pub mod controls;
pub mod game_thread;
pub mod palette_visualizer;
pub mod panel_display;
pub mod ui_traits;
