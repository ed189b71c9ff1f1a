use serde::{Deserialize, Serialize};

/// Bridge state codes. Fixed by the host bridge.
pub const UPLOAD_UPLOADING: u32 = 1;
pub const UPLOAD_SUCCEEDED: u32 = 2;
pub const UPLOAD_FAILED: u32 = 3;
pub const UPLOAD_RESET: u32 = 4;

pub const SAVE_SAVING: u32 = 5;
pub const SAVE_SUCCEEDED: u32 = 6;
pub const SAVE_FAILED: u32 = 7;
pub const SAVE_RESET: u32 = 8;
pub const SAVE_RESULT: u32 = 9;
pub const SAVE_MODEL_CREATED: u32 = 10;

/// The two independent event streams. Each one has its own subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFamily {
    Upload,
    Save,
}

impl EventFamily {
    pub const ALL: [EventFamily; 2] = [EventFamily::Upload, EventFamily::Save];

    pub(crate) fn index(self) -> usize {
        match self {
            EventFamily::Upload => 0,
            EventFamily::Save => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Uploading,
    Succeeded,
    Failed,
    Reset,
}

impl UploadKind {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            UPLOAD_UPLOADING => Some(UploadKind::Uploading),
            UPLOAD_SUCCEEDED => Some(UploadKind::Succeeded),
            UPLOAD_FAILED => Some(UploadKind::Failed),
            UPLOAD_RESET => Some(UploadKind::Reset),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            UploadKind::Uploading => UPLOAD_UPLOADING,
            UploadKind::Succeeded => UPLOAD_SUCCEEDED,
            UploadKind::Failed => UPLOAD_FAILED,
            UploadKind::Reset => UPLOAD_RESET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveKind {
    Saving,
    Succeeded,
    Failed,
    Reset,
    Result,
    ModelCreated,
}

impl SaveKind {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            SAVE_SAVING => Some(SaveKind::Saving),
            SAVE_SUCCEEDED => Some(SaveKind::Succeeded),
            SAVE_FAILED => Some(SaveKind::Failed),
            SAVE_RESET => Some(SaveKind::Reset),
            SAVE_RESULT => Some(SaveKind::Result),
            SAVE_MODEL_CREATED => Some(SaveKind::ModelCreated),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            SaveKind::Saving => SAVE_SAVING,
            SaveKind::Succeeded => SAVE_SUCCEEDED,
            SaveKind::Failed => SAVE_FAILED,
            SaveKind::Reset => SAVE_RESET,
            SaveKind::Result => SAVE_RESULT,
            SaveKind::ModelCreated => SAVE_MODEL_CREATED,
        }
    }
}

/// A decoded event kind, tagged with the family it was delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Upload(UploadKind),
    Save(SaveKind),
}

impl Transition {
    pub const COUNT: usize = 10;

    /// Decode a raw state code for the given family. Codes belonging to the
    /// other family, or to no family at all, yield `None`.
    pub fn decode(family: EventFamily, code: u32) -> Option<Self> {
        match family {
            EventFamily::Upload => UploadKind::from_code(code).map(Transition::Upload),
            EventFamily::Save => SaveKind::from_code(code).map(Transition::Save),
        }
    }

    pub fn family(self) -> EventFamily {
        match self {
            Transition::Upload(_) => EventFamily::Upload,
            Transition::Save(_) => EventFamily::Save,
        }
    }

    /// Dense slot in `0..COUNT`, used by the hook table.
    pub(crate) fn slot(self) -> usize {
        match self {
            Transition::Upload(kind) => kind.code() as usize - 1,
            Transition::Save(kind) => kind.code() as usize - 1,
        }
    }
}
