//! Status bar: status line, progress bar and the Generate button.

use egui::{Color32, RichText, Ui};

use crate::frontend::state::JobStatus;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub status: &'a JobStatus,
}

/// Render the status bar, returning whether Generate was clicked.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) -> bool {
    let status = ctx.status;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 10.0;

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let button = egui::Button::new("Generate").min_size(egui::vec2(96.0, 0.0));
            let clicked = ui.add_enabled(!status.running, button).clicked();

            ui.add(
                egui::ProgressBar::new(status.progress)
                    .desired_width(150.0)
                    .animate(status.running),
            );

            let text = RichText::new(&status.message);
            if status.message.starts_with("Error:") {
                ui.colored_label(Color32::LIGHT_RED, text);
            } else {
                ui.label(text);
            }

            clicked
        })
        .inner
    })
    .inner
}
