//! Panel components of the main window
//!
//! Each function renders one area of the form and returns the actions the
//! user triggered in it.

use std::path::Path;

use egui::{RichText, Ui};

use super::state::{AppAction, ModelListState};

/// Author credit in the footer
pub const AUTHOR_CREDIT: &str = "Made by Osman Teksoy";

/// Author link in the footer
pub const AUTHOR_URL: &str = "https://github.com/ottamina";

/// Spotify URL text field
pub const URL_FIELD_ID: &str = "spotify_url";

/// URL entry and save location side by side
///
/// Enter in the URL field submits the form.
pub fn render_inputs(ui: &mut Ui, url: &mut String, output_path: &mut String) -> Vec<AppAction> {
    let mut actions = Vec::new();

    ui.columns(2, |columns| {
        columns[0].label("Spotify URL:");
        let response = columns[0].add(
            egui::TextEdit::singleline(url)
                .id(egui::Id::new(URL_FIELD_ID))
                .hint_text("https://open.spotify.com/track/...")
                .desired_width(f32::INFINITY),
        );
        if response.lost_focus() && columns[0].input(|i| i.key_pressed(egui::Key::Enter)) {
            actions.push(AppAction::Generate);
        }

        columns[1].label("Save Location:");
        columns[1].horizontal(|ui| {
            if ui.button("...").on_hover_text("Choose output file").clicked() {
                actions.push(AppAction::BrowseOutput);
            }
            ui.add(egui::TextEdit::singleline(output_path).desired_width(f32::INFINITY));
        });
    });

    actions
}

/// Base model list with folder and refresh controls
pub fn render_model_list(ui: &mut Ui, models: &ModelListState, dir: &Path) -> Vec<AppAction> {
    let mut actions = Vec::new();

    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("Base Model Selection (.step / .stl files)").strong());
        ui.add_space(4.0);

        let list_height = (ui.available_height() - 40.0).max(80.0);
        egui::ScrollArea::vertical()
            .max_height(list_height)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if let Some(placeholder) = models.placeholder() {
                    ui.label(RichText::new(placeholder).weak());
                    if let Some(error) = &models.error {
                        ui.label(RichText::new(error).small().weak());
                    }
                    return;
                }

                for (i, model) in models.models.iter().enumerate() {
                    let selected = models.selected == Some(i);
                    let row = ui
                        .selectable_label(selected, model.name.as_str())
                        .on_hover_text(format!("{} - {}", model.format, model.path.display()));
                    if row.clicked() {
                        actions.push(AppAction::SelectModel(i));
                    }
                }
            });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new(dir.display().to_string()).small().weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    actions.push(AppAction::RefreshModels);
                }
                if ui.button("Folder...").clicked() {
                    actions.push(AppAction::BrowseModelsDir);
                }
            });
        });
    });

    actions
}

/// Author link on the left, credit on the right
pub fn render_footer(ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.hyperlink_to("github.com/ottamina", AUTHOR_URL);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(AUTHOR_CREDIT);
        });
    });
}
