use log::info;

use crate::bridge::Subscription;
use crate::event::EventFamily;

/// At most one live subscription per family, released exactly once.
///
/// Once torn down the set stays closed: later `ensure` calls do nothing.
/// Dropping the set tears it down, so every exit path releases its handles.
#[derive(Default)]
pub(crate) struct SubscriptionSet {
    slots: [Option<Box<dyn Subscription>>; 2],
    torn_down: bool,
}

impl SubscriptionSet {
    /// Acquire a subscription for `family` unless one is already live.
    /// Returns whether `acquire` was called.
    pub(crate) fn ensure(
        &mut self,
        family: EventFamily,
        acquire: impl FnOnce() -> Box<dyn Subscription>,
    ) -> bool {
        if self.torn_down {
            info!("SubscriptionSet::ensure: {:?} after teardown, ignored", family);
            return false;
        }
        let slot = &mut self.slots[family.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(acquire());
        true
    }

    pub(crate) fn is_live(&self, family: EventFamily) -> bool {
        self.slots[family.index()].is_some()
    }

    pub(crate) fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Release every live handle. Safe before any `ensure` and safe to repeat.
    /// Returns the number of handles released by this call.
    pub(crate) fn teardown_all(&mut self) -> usize {
        self.torn_down = true;
        let mut released = 0;
        for family in EventFamily::ALL {
            if let Some(subscription) = self.slots[family.index()].take() {
                subscription.release();
                released += 1;
                info!("SubscriptionSet::teardown_all: released {:?}", family);
            }
        }
        released
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.teardown_all();
    }
}
