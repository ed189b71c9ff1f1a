use crate::state::UiState;

/// Trait for the host view that redraws when the tracked state changes.
///
/// `on_state_changed` is called after each relevant event whose transition
/// produced a different `UiState`, outside of the tracker's internal lock,
/// on the thread that delivered the event. It is never called after the
/// tracker has been unmounted.
pub trait ProgressObserver: Send + Sync + 'static {
    fn on_state_changed(&self, state: &UiState);
}
