pub mod channel_bridge;

use std::sync::Arc;

use crate::event::EventFamily;
use crate::types::ProgressEvent;

pub use channel_bridge::{BridgeSender, ChannelBridge, ChannelBridgeBuilder, EventPump};

/// Callback the bridge invokes for every event of the subscribed family.
pub type EventHandler = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Handle to a live bridge subscription. Releasing consumes the handle, so
/// a subscription can be released at most once.
pub trait Subscription: Send {
    fn release(self: Box<Self>);
}

/// The host's event source for upload and save notifications.
pub trait EventBridge: Send + Sync {
    fn subscribe(&self, family: EventFamily, handler: EventHandler) -> Box<dyn Subscription>;

    fn subscribe_upload(&self, handler: EventHandler) -> Box<dyn Subscription> {
        self.subscribe(EventFamily::Upload, handler)
    }

    fn subscribe_save(&self, handler: EventHandler) -> Box<dyn Subscription> {
        self.subscribe(EventFamily::Save, handler)
    }
}
