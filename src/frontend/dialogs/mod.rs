//! Dialog windows
//!
//! The window has two dialogs: a message box for job results and validation
//! problems, and the preferences editor. Both are driven by [`show_dialog`],
//! which opens them while their `open` flag is set and clears the state when
//! they close.

use egui::{Align2, Context, Ui};

pub mod message;
pub mod preferences;

pub use message::{MessageDialog, MessageKind, MessageState};
pub use preferences::{PreferencesDialog, PreferencesState};

/// What a dialog asks for after a frame
#[derive(Debug, Clone, PartialEq)]
pub enum DialogAction<T> {
    /// Stay open
    None,
    /// Close and discard the edits
    Close,
    /// Close and hand the result to the app
    Apply(T),
}

impl<T> DialogAction<T> {
    pub fn closes(&self) -> bool {
        !matches!(self, DialogAction::None)
    }

    pub fn into_applied(self) -> Option<T> {
        match self {
            DialogAction::Apply(value) => Some(value),
            _ => None,
        }
    }
}

/// A dialog rendered into its own `egui::Window`
pub trait Dialog {
    /// Edited state; reset to its default when the dialog closes
    type State: Default;

    /// Result handed back on apply
    type Output;

    /// Initial window width
    const WIDTH: f32;

    /// Pinned to the middle of the screen instead of freely movable
    const CENTERED: bool = false;

    fn title(state: &Self::State) -> &'static str;

    fn render(state: &mut Self::State, ui: &mut Ui) -> DialogAction<Self::Output>;
}

/// Show `D` while `open` is set
///
/// Returns the dialog's output on the frame it is applied.
pub fn show_dialog<D: Dialog>(
    ctx: &Context,
    open: &mut bool,
    state: &mut D::State,
) -> Option<D::Output> {
    if !*open {
        return None;
    }

    let mut window = egui::Window::new(D::title(state))
        .collapsible(false)
        .resizable(!D::CENTERED)
        .default_width(D::WIDTH);
    if D::CENTERED {
        window = window.anchor(Align2::CENTER_CENTER, [0.0, 0.0]);
    }

    let action = window
        .show(ctx, |ui| D::render(state, ui))
        .and_then(|response| response.inner)
        .unwrap_or(DialogAction::None);

    if action.closes() {
        *open = false;
        *state = D::State::default();
    }
    action.into_applied()
}
