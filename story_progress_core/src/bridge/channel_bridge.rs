use std::sync::{Arc, Mutex, Weak};

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{EventBridge, EventHandler, Subscription};
use crate::event::EventFamily;
use crate::types::{ProgressError, ProgressEvent};

/// Default channel capacity between producers and the pump.
const DEFAULT_CAPACITY: usize = 256;

struct Registration {
    id: Uuid,
    family: EventFamily,
    handler: EventHandler,
}

/// Handlers in registration order.
type Registry = Arc<Mutex<Vec<Registration>>>;

/// In-process bridge that funnels events from any number of producers
/// through one bounded channel and delivers them from a single pump task.
///
/// # Lifecycle
///
/// | Step                          | Effect                                   |
/// |-------------------------------|------------------------------------------|
/// | `ChannelBridge::builder().build()` | returns bridge, sender and pump     |
/// | `tokio::spawn(pump.run())`    | starts in-order delivery                 |
/// | `sender.send(family, event)`  | queues an event                          |
/// | all senders dropped / cancel  | pump drains what it has and returns      |
#[derive(Clone)]
pub struct ChannelBridge {
    handlers: Registry,
}

pub struct ChannelBridgeBuilder {
    capacity: usize,
    cancel_token: CancellationToken,
}

impl ChannelBridgeBuilder {
    fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn build(self) -> (ChannelBridge, BridgeSender, EventPump) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let handlers: Registry = Arc::new(Mutex::new(Vec::new()));
        let bridge = ChannelBridge {
            handlers: Arc::clone(&handlers),
        };
        let pump = EventPump {
            rx,
            handlers,
            cancel_token: self.cancel_token,
        };
        (bridge, BridgeSender { tx }, pump)
    }
}

impl ChannelBridge {
    pub fn builder() -> ChannelBridgeBuilder {
        ChannelBridgeBuilder::new()
    }

    /// Number of live handlers for `family`.
    pub fn handler_count(&self, family: EventFamily) -> usize {
        match self.handlers.lock() {
            Ok(guard) => guard.iter().filter(|r| r.family == family).count(),
            Err(_) => 0,
        }
    }
}

impl EventBridge for ChannelBridge {
    fn subscribe(&self, family: EventFamily, handler: EventHandler) -> Box<dyn Subscription> {
        let id = Uuid::new_v4();
        if let Ok(mut guard) = self.handlers.lock() {
            guard.push(Registration {
                id,
                family,
                handler,
            });
        }
        info!("ChannelBridge::subscribe: family={:?} id={}", family, id);
        Box::new(ChannelSubscription {
            id,
            handlers: Arc::downgrade(&self.handlers),
        })
    }
}

struct ChannelSubscription {
    id: Uuid,
    handlers: Weak<Mutex<Vec<Registration>>>,
}

impl Subscription for ChannelSubscription {
    fn release(self: Box<Self>) {
        // The bridge may already be gone; nothing left to detach from then.
        let Some(handlers) = self.handlers.upgrade() else {
            return;
        };
        if let Ok(mut guard) = handlers.lock() {
            guard.retain(|r| r.id != self.id);
        }
        info!("ChannelBridge::release: id={}", self.id);
    }
}

/// Producer side of the bridge. Cheap to clone; the pump stops once every
/// clone has been dropped.
#[derive(Clone)]
pub struct BridgeSender {
    tx: mpsc::Sender<(EventFamily, ProgressEvent)>,
}

impl BridgeSender {
    pub async fn send(&self, family: EventFamily, event: ProgressEvent) -> Result<(), ProgressError> {
        self.tx.send((family, event)).await.map_err(|_| {
            warn!("BridgeSender::send: pump is gone, event dropped");
            ProgressError::BridgeClosed
        })
    }

    /// Non-async variant for producers outside the runtime. Fails when the
    /// channel is full or closed.
    pub fn try_send(&self, family: EventFamily, event: ProgressEvent) -> Result<(), ProgressError> {
        self.tx.try_send((family, event)).map_err(|e| {
            warn!("BridgeSender::try_send: {}", e);
            ProgressError::BridgeClosed
        })
    }

    /// Decode a raw JSON payload and queue it.
    pub async fn send_json(&self, family: EventFamily, raw: &str) -> Result<(), ProgressError> {
        let event = ProgressEvent::from_json(raw)?;
        self.send(family, event).await
    }
}

/// The single consumer. Delivers each event, in arrival order, to every
/// handler registered for its family at the moment of delivery.
pub struct EventPump {
    rx: mpsc::Receiver<(EventFamily, ProgressEvent)>,
    handlers: Registry,
    cancel_token: CancellationToken,
}

impl EventPump {
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run until every sender is dropped or the token is cancelled.
    /// Returns the number of events delivered.
    pub async fn run(mut self) -> usize {
        let mut delivered = 0;
        loop {
            let msg = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    info!("EventPump::run: cancelled after {} events", delivered);
                    break;
                }
                msg = self.rx.recv() => msg,
            };
            match msg {
                Some((family, event)) => {
                    self.deliver(family, &event);
                    delivered += 1;
                }
                None => {
                    info!("EventPump::run: all senders closed after {} events", delivered);
                    break;
                }
            }
        }
        delivered
    }

    fn deliver(&self, family: EventFamily, event: &ProgressEvent) {
        // Snapshot under the lock, invoke outside it, so handlers may
        // subscribe or release without deadlocking the pump.
        let targets: Vec<EventHandler> = match self.handlers.lock() {
            Ok(guard) => guard
                .iter()
                .filter(|r| r.family == family)
                .map(|r| Arc::clone(&r.handler))
                .collect(),
            Err(_) => Vec::new(),
        };
        debug!(
            "EventPump::deliver: family={:?} state={} handlers={}",
            family,
            event.state,
            targets.len()
        );
        for handler in targets {
            handler(event);
        }
    }
}
