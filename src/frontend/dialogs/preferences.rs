//! Preferences dialog
//!
//! Edits the generator settings (code style, scan, relief layout, network,
//! export) and the appearance preferences. Applying saves `generator.toml`
//! and pushes the new settings to the backend.

use egui::{DragValue, Ui};

use crate::config::{GeneratorConfig, StlFormat, UiPreferences};
use crate::frontend::dialogs::{Dialog, DialogAction};

/// State for the preferences dialog
#[derive(Debug, Clone, Default)]
pub struct PreferencesState {
    pub config: GeneratorConfig,
    pub ui: UiPreferences,
}

impl PreferencesState {
    pub fn new(config: &GeneratorConfig, ui: &UiPreferences) -> Self {
        Self {
            config: config.clone(),
            ui: ui.clone(),
        }
    }

    /// First problem with the edited values, if any
    pub fn validation_error(&self) -> Option<&'static str> {
        let scan = &self.config.scan;
        let layout = &self.config.layout;
        if self.config.style.size == 0 {
            Some("Code size must be positive")
        } else if scan.reference_width == 0 || scan.scale_divisor <= 0.0 {
            Some("Reference width and scale divisor must be positive")
        } else if scan.crop.width == 0 || scan.crop.height == 0 {
            Some("Crop region must not be empty")
        } else if layout.slot_width <= 0.0 || layout.depth <= 0.0 {
            Some("Slot width and depth must be positive")
        } else if layout.length_per_unit < 0.0 {
            Some("Length per unit must not be negative")
        } else if self.config.network.timeout_secs == 0 {
            Some("Timeout must be at least one second")
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation_error().is_none()
    }
}

/// The preferences dialog
pub struct PreferencesDialog;

impl Dialog for PreferencesDialog {
    type State = PreferencesState;
    /// Edited settings to save and push to the backend
    type Output = PreferencesState;

    const WIDTH: f32 = 420.0;

    fn title(_state: &Self::State) -> &'static str {
        "Preferences"
    }

    fn render(state: &mut Self::State, ui: &mut Ui) -> DialogAction<Self::Output> {
        egui::ScrollArea::vertical().max_height(460.0).show(ui, |ui| {
            render_code_section(ui, &mut state.config);
            ui.add_space(8.0);
            render_layout_section(ui, &mut state.config);
            ui.add_space(8.0);
            render_general_section(ui, state);
        });

        if let Some(problem) = state.validation_error() {
            ui.colored_label(egui::Color32::LIGHT_RED, problem);
        }

        ui.add_space(8.0);
        ui.separator();
        ui.horizontal(|ui| {
            let apply = ui.add_enabled(state.is_valid(), egui::Button::new("Apply"));
            if apply.clicked() {
                return DialogAction::Apply(state.clone());
            }
            if ui.button("Cancel").clicked() {
                return DialogAction::Close;
            }
            if ui.button("Restore Defaults").clicked() {
                state.config = GeneratorConfig::default();
            }
            DialogAction::None
        })
        .inner
    }
}

fn render_code_section(ui: &mut Ui, config: &mut GeneratorConfig) {
    ui.heading("Spotify Code");
    ui.add_space(4.0);

    egui::Grid::new("prefs_code_grid")
        .num_columns(2)
        .spacing([10.0, 8.0])
        .show(ui, |ui| {
            ui.label("Image format:");
            egui::ComboBox::from_id_salt("code_format")
                .selected_text(config.style.format.as_str())
                .show_ui(ui, |ui| {
                    for format in ["jpeg", "png"] {
                        ui.selectable_value(&mut config.style.format, format.to_string(), format);
                    }
                });
            ui.end_row();

            ui.label("Background:");
            ui.text_edit_singleline(&mut config.style.background);
            ui.end_row();

            ui.label("Bar colour:");
            egui::ComboBox::from_id_salt("code_bar_color")
                .selected_text(config.style.bar_color.as_str())
                .show_ui(ui, |ui| {
                    for color in ["white", "black"] {
                        ui.selectable_value(&mut config.style.bar_color, color.to_string(), color);
                    }
                });
            ui.end_row();

            ui.label("Size:");
            ui.add(DragValue::new(&mut config.style.size).range(64..=2048).suffix(" px"));
            ui.end_row();

            let scan = &mut config.scan;
            ui.label("Crop (x, y):");
            ui.horizontal(|ui| {
                ui.add(DragValue::new(&mut scan.crop.x));
                ui.add(DragValue::new(&mut scan.crop.y));
            });
            ui.end_row();

            ui.label("Crop (w, h):");
            ui.horizontal(|ui| {
                ui.add(DragValue::new(&mut scan.crop.width));
                ui.add(DragValue::new(&mut scan.crop.height));
            });
            ui.end_row();

            ui.label("Threshold:");
            ui.add(egui::Slider::new(&mut scan.threshold, 0..=254));
            ui.end_row();

            ui.label("Pixels per unit:");
            ui.add(DragValue::new(&mut scan.scale_divisor).speed(0.1).range(0.1..=1000.0));
            ui.end_row();

            ui.label("Reference width:");
            ui.add(DragValue::new(&mut scan.reference_width).suffix(" px"));
            ui.end_row();
        });
}

fn render_layout_section(ui: &mut Ui, config: &mut GeneratorConfig) {
    ui.heading("Relief Layout");
    ui.add_space(4.0);

    let layout = &mut config.layout;
    egui::Grid::new("prefs_layout_grid")
        .num_columns(2)
        .spacing([10.0, 8.0])
        .show(ui, |ui| {
            ui.label("First bar (x, y):");
            ui.horizontal(|ui| {
                ui.add(mm(&mut layout.origin_x));
                ui.add(mm(&mut layout.origin_y));
            });
            ui.end_row();

            ui.label("Pitch:");
            ui.add(mm(&mut layout.pitch));
            ui.end_row();

            ui.label("Length per unit:");
            ui.add(mm(&mut layout.length_per_unit));
            ui.end_row();

            ui.label("Slot width:");
            ui.add(mm(&mut layout.slot_width));
            ui.end_row();

            ui.label("Depth:");
            ui.add(mm(&mut layout.depth));
            ui.end_row();

            ui.label("Base Z:");
            ui.add(mm(&mut layout.base_z));
            ui.end_row();

            ui.label("Arc segments:");
            ui.add(DragValue::new(&mut layout.arc_segments).range(1..=128));
            ui.end_row();
        });
}

fn mm(value: &mut f64) -> DragValue<'_> {
    DragValue::new(value).speed(0.05).suffix(" mm")
}

fn render_general_section(ui: &mut Ui, state: &mut PreferencesState) {
    ui.heading("General");
    ui.add_space(4.0);

    egui::Grid::new("prefs_general_grid")
        .num_columns(2)
        .spacing([10.0, 8.0])
        .show(ui, |ui| {
            ui.label("HTTP timeout:");
            ui.add(
                DragValue::new(&mut state.config.network.timeout_secs)
                    .range(1..=600)
                    .suffix(" s"),
            );
            ui.end_row();

            ui.label("STL format:");
            egui::ComboBox::from_id_salt("stl_format")
                .selected_text(state.config.export.stl_format.to_string())
                .show_ui(ui, |ui| {
                    for format in [StlFormat::Binary, StlFormat::Ascii] {
                        ui.selectable_value(
                            &mut state.config.export.stl_format,
                            format,
                            format.to_string(),
                        );
                    }
                });
            ui.end_row();

            ui.label("Dark mode:");
            ui.checkbox(&mut state.ui.dark_mode, "");
            ui.end_row();

            ui.label("Font scale:");
            ui.add(egui::Slider::new(&mut state.ui.font_scale, 0.5..=2.0).step_by(0.1));
            ui.end_row();
        });
}
