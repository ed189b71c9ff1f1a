use serde::Serialize;

use crate::event::{SaveKind, Transition, UploadKind};
use crate::types::ProgressEvent;

/// The UI-relevant state of a story's uploads and saves.
///
/// Upload and save are presented as mutually exclusive: a progress event of
/// one family always clears the other family's flags, so no single
/// transition leaves both `is_upload_in_progress` and `is_save_in_progress`
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub progress: f64,
    pub is_upload_in_progress: bool,
    pub is_upload_failed: bool,
    pub is_save_in_progress: bool,
    pub is_save_failed: bool,
}

impl UiState {
    pub fn initial() -> Self {
        Self::default()
    }

    /// Next state after `transition`, carrying `event`'s payload.
    ///
    /// | Transition            | Effect                                                      |
    /// |-----------------------|-------------------------------------------------------------|
    /// | Upload UPLOADING      | progress from payload, upload in progress, everything else cleared |
    /// | Upload SUCCEEDED      | clears upload and save in-progress                          |
    /// | Upload FAILED         | clears upload in-progress, sets upload failed               |
    /// | Upload RESET          | clears upload in-progress and upload failed                 |
    /// | Save SAVING           | progress from payload, save in progress, everything else cleared |
    /// | Save SUCCEEDED        | clears save in-progress                                     |
    /// | Save FAILED           | clears save in-progress, sets save failed                   |
    /// | Save RESET            | clears upload in-progress and upload failed (not the save flags) |
    /// | Save RESULT           | progress from payload, clears both in-progress, save failed = !success |
    /// | Save MODEL_CREATED    | clears all four flags, progress untouched                   |
    pub fn apply(self, transition: Transition, event: &ProgressEvent) -> UiState {
        match transition {
            Transition::Upload(kind) => self.apply_upload(kind, event),
            Transition::Save(kind) => self.apply_save(kind, event),
        }
    }

    fn apply_upload(self, kind: UploadKind, event: &ProgressEvent) -> UiState {
        match kind {
            UploadKind::Uploading => UiState {
                progress: next_progress(self.progress, event.progress),
                is_upload_in_progress: true,
                is_upload_failed: false,
                is_save_in_progress: false,
                is_save_failed: false,
            },
            UploadKind::Succeeded => UiState {
                is_upload_in_progress: false,
                is_save_in_progress: false,
                ..self
            },
            UploadKind::Failed => UiState {
                is_upload_in_progress: false,
                is_upload_failed: true,
                ..self
            },
            UploadKind::Reset => UiState {
                is_upload_in_progress: false,
                is_upload_failed: false,
                ..self
            },
        }
    }

    fn apply_save(self, kind: SaveKind, event: &ProgressEvent) -> UiState {
        match kind {
            SaveKind::Saving => UiState {
                progress: next_progress(self.progress, event.progress),
                is_upload_in_progress: false,
                is_upload_failed: false,
                is_save_in_progress: true,
                is_save_failed: false,
            },
            SaveKind::Succeeded => UiState {
                is_save_in_progress: false,
                ..self
            },
            SaveKind::Failed => UiState {
                is_save_in_progress: false,
                is_save_failed: true,
                ..self
            },
            // Observed bridge behaviour: a save reset clears the upload flags.
            SaveKind::Reset => UiState {
                is_upload_in_progress: false,
                is_upload_failed: false,
                ..self
            },
            SaveKind::Result => UiState {
                progress: next_progress(self.progress, event.progress),
                is_upload_in_progress: false,
                is_save_in_progress: false,
                is_save_failed: !event.success.unwrap_or(false),
                ..self
            },
            SaveKind::ModelCreated => UiState {
                progress: self.progress,
                is_upload_in_progress: false,
                is_upload_failed: false,
                is_save_in_progress: false,
                is_save_failed: false,
            },
        }
    }
}

/// Missing or non-finite progress keeps the current value.
fn next_progress(current: f64, reported: Option<f64>) -> f64 {
    match reported {
        Some(p) if p.is_finite() => p.clamp(0.0, 1.0),
        _ => current,
    }
}
