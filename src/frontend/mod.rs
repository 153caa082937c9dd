//! Frontend module for egui UI
//!
//! The window is a single form: Spotify URL, save location, base model list
//! and a status bar with the Generate button. Jobs are sent to the backend
//! thread through crossbeam channels and their progress is folded back into
//! the status bar every frame.
//!
//! # Main Types
//!
//! - [`KeychainApp`] - Main application state implementing [`eframe::App`]
//! - [`JobStatus`] - Status line and progress of the current job
//! - [`ModelListState`] - Base models found in the model folder
//!
//! # Submodules
//!
//! - [`dialogs`] - Message box and preferences dialog
//! - `panels` - Form sections and footer
//! - `status_bar` - Status line, progress bar and Generate button

pub mod dialogs;
mod panels;
pub mod state;
mod status_bar;

pub use panels::{
    render_footer, render_inputs, render_model_list, AUTHOR_CREDIT, AUTHOR_URL, URL_FIELD_ID,
};
pub use state::{validate_form, AppAction, JobStatus, ModelListState, Notice, READY_STATUS};
pub use status_bar::{render_status_bar, StatusBarContext};

use std::path::PathBuf;
use std::time::Duration;

use dialogs::{show_dialog, MessageDialog, MessageState, PreferencesDialog, PreferencesState};

use crate::backend::{BackendMessage, FrontendReceiver};
use crate::config::{AppState, GeneratorConfig, RecentGeneration, UiPreferences};
use crate::types::GenerationRequest;

/// Repaint interval while a job is running
const RUNNING_REPAINT: Duration = Duration::from_millis(50);

/// Main application state
pub struct KeychainApp {
    frontend: FrontendReceiver,
    config: GeneratorConfig,
    app_state: AppState,
    /// Style before font scaling, so rescaling does not compound
    base_style: egui::Style,

    url: String,
    output_path: String,
    models: ModelListState,
    status: JobStatus,
    /// Base model name of the running job, for the recents list
    pending_model: Option<String>,

    message_open: bool,
    message_state: MessageState,
    preferences_open: bool,
    preferences_state: PreferencesState,
}

impl KeychainApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        frontend: FrontendReceiver,
        config: GeneratorConfig,
        app_state: AppState,
    ) -> Self {
        let base_style = (*cc.egui_ctx.style()).clone();
        apply_ui_preferences(&cc.egui_ctx, &base_style, &app_state.ui_preferences);

        let models_dir = app_state.base_models_dir();
        tracing::info!("Scanning base models in {:?}", models_dir);
        frontend.refresh_models(models_dir);

        Self {
            frontend,
            config,
            url: app_state.last_url.clone(),
            output_path: app_state.output_path().display().to_string(),
            app_state,
            base_style,
            models: ModelListState::default(),
            status: JobStatus::default(),
            pending_model: None,
            message_open: false,
            message_state: MessageState::default(),
            preferences_open: false,
            preferences_state: PreferencesState::default(),
        }
    }

    fn process_backend_messages(&mut self) -> bool {
        let messages = self.frontend.drain();
        let had_messages = !messages.is_empty();

        for msg in messages {
            match &msg {
                BackendMessage::ModelList(Ok(models)) => {
                    tracing::debug!("Received {} base models", models.len());
                    let preferred = self.app_state.last_base_model.clone();
                    self.models.set_models(models.clone(), preferred.as_deref());
                }
                BackendMessage::ModelList(Err(e)) => {
                    tracing::warn!("Base model scan failed: {}", e);
                    self.models.set_error(e.clone());
                }
                BackendMessage::Completed(summary) => {
                    let base_model = self.pending_model.take().unwrap_or_default();
                    self.app_state.add_recent_generation(RecentGeneration::new(
                        summary.link.uri(),
                        summary.output_path.clone(),
                        base_model,
                        summary.bar_count(),
                    ));
                    if let Err(e) = self.app_state.save() {
                        tracing::warn!("Failed to save app state: {}", e);
                    }
                }
                BackendMessage::Failed(_) => {
                    self.pending_model = None;
                }
                BackendMessage::ConfigRejected(e) => {
                    tracing::warn!("Backend kept previous settings: {}", e);
                }
                BackendMessage::Shutdown => {
                    tracing::info!("Backend shutdown received");
                }
                BackendMessage::Progress { .. } => {}
            }

            if let Some(notice) = self.status.apply(&msg) {
                self.show_message(notice.into());
            }
        }

        had_messages
    }

    fn show_message(&mut self, state: MessageState) {
        self.message_state = state;
        self.message_open = true;
    }

    fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Generate => self.start_generation(),
            AppAction::BrowseOutput => {
                let current = PathBuf::from(self.output_path.trim());
                let mut dialog = rfd::FileDialog::new()
                    .add_filter("STL files", &["stl"])
                    .set_file_name("model.stl");
                if let Some(dir) = current.parent().filter(|d| d.is_dir()) {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(mut path) = dialog.save_file() {
                    if path.extension().is_none() {
                        path.set_extension("stl");
                    }
                    self.output_path = path.display().to_string();
                }
            }
            AppAction::RefreshModels => {
                self.frontend.refresh_models(self.app_state.base_models_dir());
            }
            AppAction::BrowseModelsDir => {
                let picked = rfd::FileDialog::new()
                    .set_directory(self.app_state.base_models_dir())
                    .pick_folder();
                if let Some(dir) = picked {
                    tracing::info!("Base model folder set to {:?}", dir);
                    self.app_state.base_models_dir = Some(dir.clone());
                    self.frontend.refresh_models(dir);
                }
            }
            AppAction::SelectModel(index) => self.models.select(index),
            AppAction::OpenPreferences => {
                self.preferences_state =
                    PreferencesState::new(&self.config, &self.app_state.ui_preferences);
                self.preferences_open = true;
            }
        }
    }

    fn start_generation(&mut self) {
        if self.status.running {
            return;
        }

        let base_model = match validate_form(&self.url, &self.models) {
            Ok(path) => path.clone(),
            Err(problem) => {
                self.show_message(MessageState::error(problem));
                return;
            }
        };

        let output = match self.output_path.trim() {
            "" => crate::config::default_output_path(),
            path => PathBuf::from(path),
        };
        self.output_path = output.display().to_string();

        let request = GenerationRequest::new(self.url.trim(), Some(base_model), output);
        self.pending_model = self.models.selected_model().map(|m| m.name.clone());

        if self.frontend.generate(request) {
            self.status.start();
        } else {
            self.pending_model = None;
            self.show_message(MessageState::error("The generator is not running"));
        }
    }

    fn apply_preferences(&mut self, ctx: &egui::Context, state: PreferencesState) {
        self.config = state.config;
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save generator settings: {}", e);
        }
        self.frontend.update_config(self.config.clone());

        self.app_state.ui_preferences = state.ui;
        apply_ui_preferences(ctx, &self.base_style, &self.app_state.ui_preferences);
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        show_dialog::<MessageDialog>(ctx, &mut self.message_open, &mut self.message_state);

        let applied = show_dialog::<PreferencesDialog>(
            ctx,
            &mut self.preferences_open,
            &mut self.preferences_state,
        );
        if let Some(state) = applied {
            self.apply_preferences(ctx, state);
        }
    }
}

/// Apply theme and font scale on top of `base_style`
fn apply_ui_preferences(ctx: &egui::Context, base_style: &egui::Style, prefs: &UiPreferences) {
    let mut style = base_style.clone();
    style.visuals = if prefs.dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    style.text_styles.iter_mut().for_each(|(_, font_id)| {
        font_id.size *= prefs.font_scale;
    });
    ctx.set_style(style);
}

impl eframe::App for KeychainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let had_messages = self.process_backend_messages();

        if had_messages {
            ctx.request_repaint();
        } else if self.status.running {
            ctx.request_repaint_after(RUNNING_REPAINT);
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Base Model Folder...").clicked() {
                        actions.push(AppAction::BrowseModelsDir);
                        ui.close();
                    }
                    if ui.button("Preferences...").clicked() {
                        actions.push(AppAction::OpenPreferences);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close();
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            render_footer(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            if render_status_bar(ui, &StatusBarContext { status: &self.status }) {
                actions.push(AppAction::Generate);
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            actions.extend(render_inputs(ui, &mut self.url, &mut self.output_path));
            ui.add_space(10.0);
            let dir = self.app_state.base_models_dir();
            actions.extend(render_model_list(ui, &self.models, &dir));
        });

        for action in actions {
            self.handle_action(action);
        }

        self.render_dialogs(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.frontend.shutdown();

        self.app_state.last_url = self.url.trim().to_string();
        let output = self.output_path.trim();
        if !output.is_empty() {
            self.app_state.last_output_path = Some(PathBuf::from(output));
        }
        if let Some(model) = self.models.selected_model() {
            self.app_state.last_base_model = Some(model.name.clone());
        }

        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }
}
