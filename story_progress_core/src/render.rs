use serde::Serialize;

use crate::state::UiState;

pub const RETRY_MESSAGE: &str = "Failed to save Story.\nPlease tap for options.";

/// What the caller's content callback receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContent {
    pub is_upload_in_progress: bool,
    pub is_upload_failed: bool,
    pub is_save_in_progress: bool,
    pub is_save_failed: bool,
    pub retry_message: &'static str,
}

/// A rendered frame: spinner visibility, percentage, the retry prompt while
/// the last save failed, and whatever the caller's content callback produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView<R> {
    pub show_spinner: bool,
    pub progress_percent: f64,
    pub retry_prompt: Option<&'static str>,
    pub content: R,
}

/// Pure projection of `state` into a frame. Reads nothing else, writes nothing.
pub fn render<R>(state: &UiState, render_content: impl FnOnce(&RenderContent) -> R) -> ProgressView<R> {
    let content = RenderContent {
        is_upload_in_progress: state.is_upload_in_progress,
        is_upload_failed: state.is_upload_failed,
        is_save_in_progress: state.is_save_in_progress,
        is_save_failed: state.is_save_failed,
        retry_message: RETRY_MESSAGE,
    };
    ProgressView {
        show_spinner: state.is_upload_in_progress || state.is_save_in_progress,
        progress_percent: state.progress * 100.0,
        retry_prompt: state.is_save_failed.then_some(RETRY_MESSAGE),
        content: render_content(&content),
    }
}
