//! Shared state types for the frontend
//!
//! The window's widgets return [`AppAction`]s instead of mutating the app
//! directly, and backend messages are folded into [`JobStatus`] and
//! [`ModelListState`]. Both are plain data so they can be tested without a
//! running UI.

use std::path::PathBuf;

use crate::backend::BackendMessage;
use crate::models::BaseModel;
use crate::pipeline::{MISSING_MODEL_MESSAGE, MISSING_URL_MESSAGE};

/// Status text before the first job
pub const READY_STATUS: &str = "Ready";

/// Actions the UI can emit
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Start a generation with the current form
    Generate,
    /// Pick the output file with a save dialog
    BrowseOutput,
    /// Rescan the base model folder
    RefreshModels,
    /// Pick a different base model folder
    BrowseModelsDir,
    /// Select a base model by list index
    SelectModel(usize),
    /// Open the preferences dialog
    OpenPreferences,
}

/// Something the user must acknowledge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Success(String),
}

/// Progress of the current or last generation
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    /// Status line text
    pub message: String,
    /// Progress bar fraction
    pub progress: f32,
    /// A job has been sent and not yet finished
    pub running: bool,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
            progress: 0.0,
            running: false,
        }
    }
}

impl JobStatus {
    /// Mark a job as submitted
    pub fn start(&mut self) {
        self.running = true;
        self.progress = 0.0;
    }

    /// Fold a backend message into the status
    ///
    /// Returns a notice for the terminal messages of a job.
    pub fn apply(&mut self, msg: &BackendMessage) -> Option<Notice> {
        match msg {
            BackendMessage::Progress { stage, message } => {
                self.message = message.clone();
                self.progress = stage.progress();
                None
            }
            BackendMessage::Completed(summary) => {
                self.running = false;
                self.progress = 1.0;
                self.message = format!("Completed: {}", summary.output_file_name());
                Some(Notice::Success(format!(
                    "Model saved to:\n{}",
                    summary.output_path.display()
                )))
            }
            BackendMessage::Failed(error) => {
                self.running = false;
                self.message = format!("Error: {}", error);
                Some(Notice::Error(error.clone()))
            }
            BackendMessage::ConfigRejected(error) => {
                Some(Notice::Error(format!("Settings not applied: {}", error)))
            }
            BackendMessage::ModelList(_) | BackendMessage::Shutdown => None,
        }
    }
}

/// Base models shown in the list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelListState {
    pub models: Vec<BaseModel>,
    pub selected: Option<usize>,
    /// Scan error, shown instead of the list
    pub error: Option<String>,
}

impl ModelListState {
    /// Replace the list, keeping the selection by name when possible
    ///
    /// Falls back to the first model, or `preferred` when it is listed.
    pub fn set_models(&mut self, models: Vec<BaseModel>, preferred: Option<&str>) {
        let keep = self
            .selected_model()
            .map(|m| m.name.clone())
            .or_else(|| preferred.map(str::to_string));

        self.selected = keep
            .and_then(|name| models.iter().position(|m| m.name == name))
            .or(if models.is_empty() { None } else { Some(0) });
        self.models = models;
        self.error = None;
    }

    /// Record a failed scan
    pub fn set_error(&mut self, error: String) {
        self.models.clear();
        self.selected = None;
        self.error = Some(error);
    }

    pub fn select(&mut self, index: usize) {
        if index < self.models.len() {
            self.selected = Some(index);
        }
    }

    pub fn selected_model(&self) -> Option<&BaseModel> {
        self.selected.and_then(|i| self.models.get(i))
    }

    /// Row shown when there is nothing to select
    pub fn placeholder(&self) -> Option<&'static str> {
        if self.error.is_some() {
            Some("(Could not read base model folder)")
        } else if self.models.is_empty() {
            Some("(No .step or .stl files found)")
        } else {
            None
        }
    }
}

/// Check the form before submitting, returning the base model path
pub fn validate_form<'a>(
    url: &str,
    models: &'a ModelListState,
) -> std::result::Result<&'a PathBuf, &'static str> {
    if url.trim().is_empty() {
        return Err(MISSING_URL_MESSAGE);
    }
    models
        .selected_model()
        .map(|m| &m.path)
        .ok_or(MISSING_MODEL_MESSAGE)
}
