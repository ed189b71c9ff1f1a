//! Progress tracking for a story's media uploads and saves.
//!
//! A [`StoryUpdateProgress`] subscribes to the upload and save event families
//! of an [`EventBridge`], drops events for media outside its story, reduces
//! the rest into a [`UiState`], fires the caller's per-transition hooks and
//! notifies [`ProgressObserver`]s when the state changes.

pub mod bridge;
pub mod event;
pub mod filter;
pub mod hooks;
pub mod observer;
pub mod render;
pub mod state;
pub mod tracker;
pub mod types;

pub use bridge::{BridgeSender, ChannelBridge, EventBridge, EventHandler, EventPump, Subscription};
pub use event::{EventFamily, SaveKind, Transition, UploadKind};
pub use hooks::TransitionHooks;
pub use observer::ProgressObserver;
pub use render::{render, ProgressView, RenderContent, RETRY_MESSAGE};
pub use state::UiState;
pub use tracker::{StoryUpdateProgress, StoryUpdateProgressBuilder};
pub use types::{MediaId, MediaItem, MediaList, ProgressError, ProgressEvent};
