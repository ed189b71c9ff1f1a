use crate::types::{MediaId, MediaItem};

/// True iff `media_id` is present and matches one of `media_items`.
///
/// An absent id or an undefined list is never relevant; the event is then
/// dropped without touching state or hooks.
pub fn is_relevant(media_id: Option<&MediaId>, media_items: Option<&[MediaItem]>) -> bool {
    match (media_id, media_items) {
        (Some(id), Some(items)) => items.iter().any(|item| &item.id == id),
        _ => false,
    }
}
