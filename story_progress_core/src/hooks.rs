use std::fmt;
use std::sync::Arc;

use crate::event::Transition;
use crate::types::ProgressEvent;

/// A caller notification sink. The return value is ignored, and a panic
/// inside a hook propagates to whoever delivered the event.
pub type Hook = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// One optional hook per transition kind.
#[derive(Clone, Default)]
pub struct TransitionHooks {
    slots: [Option<Hook>; Transition::COUNT],
}

impl TransitionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for `transition`, replacing any previous one.
    pub fn on<F>(mut self, transition: Transition, hook: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.slots[transition.slot()] = Some(Arc::new(hook));
        self
    }

    pub fn get(&self, transition: Transition) -> Option<&Hook> {
        self.slots[transition.slot()].as_ref()
    }

    pub fn is_registered(&self, transition: Transition) -> bool {
        self.get(transition).is_some()
    }

    pub(crate) fn fire(&self, transition: Transition, event: &ProgressEvent) {
        if let Some(hook) = self.get(transition) {
            hook(event);
        }
    }
}

impl fmt::Debug for TransitionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("TransitionHooks")
            .field("registered", &registered)
            .finish()
    }
}
