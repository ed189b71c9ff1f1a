use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Malformed event payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Bridge closed: no pump is receiving events")]
    BridgeClosed,
    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },
}

// ---------------------------------------------------------------------------
// Media items
// ---------------------------------------------------------------------------

/// Opaque identifier of a media item inside a story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MediaId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One uploadable asset of a story. Only `id` is read by the tracker; every
/// other field belongs to the caller and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl MediaItem {
    pub fn new(id: impl Into<MediaId>) -> Self {
        Self {
            id: id.into(),
            fields: serde_json::Map::new(),
        }
    }
}

/// Caller-owned list of the story's media items.
///
/// The tracker holds a clone of this handle and re-reads it on every event,
/// so the caller can swap the list at any time with [`MediaList::set`].
/// `None` models a list that has not been supplied yet.
#[derive(Debug, Clone, Default)]
pub struct MediaList {
    items: Arc<RwLock<Option<Vec<MediaItem>>>>,
}

impl MediaList {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items: Arc::new(RwLock::new(Some(items))),
        }
    }

    /// A list that is not defined at all. Every event is irrelevant to it.
    pub fn undefined() -> Self {
        Self::default()
    }

    pub fn set(&self, items: Option<Vec<MediaItem>>) {
        if let Ok(mut guard) = self.items.write() {
            *guard = items;
        }
    }

    /// Run `f` against the current list while holding the read lock.
    pub fn with_items<T>(&self, f: impl FnOnce(Option<&[MediaItem]>) -> T) -> T {
        match self.items.read() {
            Ok(guard) => f(guard.as_deref()),
            Err(_) => f(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

/// Raw event as delivered by the host bridge.
///
/// `state` is the integer kind code; it is decoded against the family of the
/// subscription that delivered it (see [`crate::event::Transition::decode`]).
/// Hooks receive this payload unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    #[serde(default)]
    pub media_id: Option<MediaId>,
    pub state: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl ProgressEvent {
    pub fn new(media_id: impl Into<MediaId>, state: u32) -> Self {
        Self {
            media_id: Some(media_id.into()),
            state,
            progress: None,
            success: None,
        }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ProgressError> {
        Ok(serde_json::from_str(raw)?)
    }
}
