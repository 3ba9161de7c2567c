/// A window of the preview, toggled from the side panel.
pub trait UiTool {
    /// Window title, also the key of its open/closed state.
    fn name(&self) -> &'static str;

    /// Whether the window is shown when the preview starts.
    fn open_at_start(&self) -> bool {
        true
    }

    /// Wraps [`UiTool::ui`] in a window.
    fn show(&mut self, ctx: &egui::Context, open: &mut bool);

    fn ui(&mut self, ui: &mut egui::Ui);
}
