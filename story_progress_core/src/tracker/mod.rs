mod subscriptions;

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};
use uuid::Uuid;

use crate::bridge::{EventBridge, EventHandler};
use crate::event::{EventFamily, Transition};
use crate::filter::is_relevant;
use crate::hooks::TransitionHooks;
use crate::observer::ProgressObserver;
use crate::render::{render, ProgressView, RenderContent};
use crate::state::UiState;
use crate::types::{MediaList, ProgressEvent};

use subscriptions::SubscriptionSet;

struct Tracked {
    ui: UiState,
    disposed: bool,
}

/// Everything the bridge handlers need. Handlers hold only a `Weak` to it.
struct TrackerCore {
    id: Uuid,
    media: MediaList,
    hooks: TransitionHooks,
    observers: Vec<Box<dyn ProgressObserver>>,
    tracked: Mutex<Tracked>,
}

impl TrackerCore {
    fn lock(&self) -> MutexGuard<'_, Tracked> {
        // A panicking hook never holds this lock, but stay usable regardless.
        self.tracked.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Filter, reduce, notify. Returns whether the state changed.
    fn handle(&self, family: EventFamily, event: &ProgressEvent) -> bool {
        let relevant = self
            .media
            .with_items(|items| is_relevant(event.media_id.as_ref(), items));
        if !relevant {
            debug!(
                "[tracker {}] dropped {:?} event for unknown media {:?}",
                self.id, family, event.media_id
            );
            return false;
        }

        let Some(transition) = Transition::decode(family, event.state) else {
            debug!(
                "[tracker {}] ignored unknown {:?} state {}",
                self.id, family, event.state
            );
            return false;
        };

        let (previous, next) = {
            let mut tracked = self.lock();
            if tracked.disposed {
                debug!("[tracker {}] late {:?} after unmount, ignored", self.id, transition);
                return false;
            }
            let previous = tracked.ui;
            tracked.ui = previous.apply(transition, event);
            (previous, tracked.ui)
        };

        self.hooks.fire(transition, event);

        let changed = previous != next;
        if changed {
            for observer in &self.observers {
                observer.on_state_changed(&next);
            }
        }
        changed
    }
}

/// Tracks the upload and save progress of one story's media.
///
/// # Lifecycle
///
/// | Call                  | Effect                                                  |
/// |-----------------------|---------------------------------------------------------|
/// | `builder(..).build()` | state `{progress: 0, all flags false}`, not subscribed  |
/// | `mount(bridge)`       | one upload and one save subscription, idempotent        |
/// | bridge delivers event | filter → reduce → hook → observers                      |
/// | `unmount()` / drop    | releases both subscriptions once; later events ignored  |
///
/// Delivery must be serialized by the bridge; [`crate::bridge::ChannelBridge`]
/// does so with a single pump task.
pub struct StoryUpdateProgress {
    core: Arc<TrackerCore>,
    subscriptions: Mutex<SubscriptionSet>,
}

pub struct StoryUpdateProgressBuilder {
    media: MediaList,
    hooks: TransitionHooks,
    observers: Vec<Box<dyn ProgressObserver>>,
}

impl StoryUpdateProgressBuilder {
    pub fn with_hooks(mut self, hooks: TransitionHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> StoryUpdateProgress {
        let core = TrackerCore {
            id: Uuid::new_v4(),
            media: self.media,
            hooks: self.hooks,
            observers: self.observers,
            tracked: Mutex::new(Tracked {
                ui: UiState::initial(),
                disposed: false,
            }),
        };
        info!("[tracker {}] created", core.id);
        StoryUpdateProgress {
            core: Arc::new(core),
            subscriptions: Mutex::new(SubscriptionSet::default()),
        }
    }
}

impl StoryUpdateProgress {
    pub fn builder(media: MediaList) -> StoryUpdateProgressBuilder {
        StoryUpdateProgressBuilder {
            media,
            hooks: TransitionHooks::new(),
            observers: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.core.id
    }

    /// Subscribe to both families.
    pub fn mount(&self, bridge: &dyn EventBridge) {
        self.ensure_upload_subscription(bridge);
        self.ensure_save_subscription(bridge);
    }

    /// No-op when an upload subscription is already live or after unmount.
    pub fn ensure_upload_subscription(&self, bridge: &dyn EventBridge) -> bool {
        self.ensure_subscription(bridge, EventFamily::Upload)
    }

    /// No-op when a save subscription is already live or after unmount.
    pub fn ensure_save_subscription(&self, bridge: &dyn EventBridge) -> bool {
        self.ensure_subscription(bridge, EventFamily::Save)
    }

    fn ensure_subscription(&self, bridge: &dyn EventBridge, family: EventFamily) -> bool {
        let handler = self.handler(family);
        let acquired = self
            .subscriptions()
            .ensure(family, || bridge.subscribe(family, handler));
        if acquired {
            info!("[tracker {}] subscribed to {:?} events", self.core.id, family);
        }
        acquired
    }

    fn handler(&self, family: EventFamily) -> EventHandler {
        let core = Arc::downgrade(&self.core);
        Arc::new(move |event: &ProgressEvent| {
            if let Some(core) = core.upgrade() {
                core.handle(family, event);
            }
        })
    }

    fn subscriptions(&self) -> MutexGuard<'_, SubscriptionSet> {
        self.subscriptions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stop tracking: later events are ignored and both subscriptions are
    /// released. Safe before `mount` and safe to repeat; handles are only
    /// ever released once.
    pub fn unmount(&self) {
        self.core.lock().disposed = true;
        let released = self.subscriptions().teardown_all();
        if released > 0 {
            info!("[tracker {}] unmounted, released {} subscriptions", self.core.id, released);
        }
    }

    pub fn is_mounted(&self) -> bool {
        let subscriptions = self.subscriptions();
        !subscriptions.is_torn_down()
            && EventFamily::ALL.iter().any(|f| subscriptions.is_live(*f))
    }

    pub fn is_subscribed(&self, family: EventFamily) -> bool {
        self.subscriptions().is_live(family)
    }

    pub fn state(&self) -> UiState {
        self.core.lock().ui
    }

    /// Feed an upload event directly, as the upload subscription would.
    pub fn handle_upload_event(&self, event: &ProgressEvent) -> bool {
        self.core.handle(EventFamily::Upload, event)
    }

    /// Feed a save event directly, as the save subscription would.
    pub fn handle_save_event(&self, event: &ProgressEvent) -> bool {
        self.core.handle(EventFamily::Save, event)
    }

    pub fn render<R>(&self, render_content: impl FnOnce(&RenderContent) -> R) -> ProgressView<R> {
        render(&self.state(), render_content)
    }
}

impl Drop for StoryUpdateProgress {
    fn drop(&mut self) {
        self.unmount();
    }
}
