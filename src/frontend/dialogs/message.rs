//! Error and success message box

use super::{Dialog, DialogAction};
use crate::frontend::state::Notice;
use egui::{Color32, Ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Error,
    Success,
}

/// State for the message dialog
#[derive(Debug, Clone, Default)]
pub struct MessageState {
    pub kind: MessageKind,
    pub text: String,
}

impl MessageState {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }
}

impl From<Notice> for MessageState {
    fn from(notice: Notice) -> Self {
        match notice {
            Notice::Error(text) => Self::error(text),
            Notice::Success(text) => Self::success(text),
        }
    }
}

/// Modal message box with an OK button
pub struct MessageDialog;

impl Dialog for MessageDialog {
    type State = MessageState;
    type Output = ();

    const WIDTH: f32 = 320.0;
    const CENTERED: bool = true;

    fn title(state: &Self::State) -> &'static str {
        match state.kind {
            MessageKind::Error => "Error",
            MessageKind::Success => "Success",
        }
    }

    fn render(state: &mut Self::State, ui: &mut Ui) -> DialogAction<Self::Output> {
        ui.horizontal(|ui| {
            let (icon, color) = match state.kind {
                MessageKind::Error => ("⚠", Color32::LIGHT_RED),
                MessageKind::Success => ("✔", Color32::LIGHT_GREEN),
            };
            ui.colored_label(color, icon);
            ui.label(state.text.as_str());
        });

        ui.separator();

        let ok = ui
            .with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.button("OK").clicked()
            })
            .inner;

        if ok || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            DialogAction::Close
        } else {
            DialogAction::None
        }
    }
}
