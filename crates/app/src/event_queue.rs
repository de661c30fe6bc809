//! Single-consumer event queue backed by a tokio unbounded mpsc channel.
//!
//! Every input of the bridge (controller events, timer firings, watchdog
//! ticks, reconnect requests, consumer commands) is funnelled through here,
//! so circuit state is only ever mutated by the one loop draining the queue.

use tokio::sync::mpsc;

use unibridge_domain::alias::Alias;
use unibridge_domain::gesture::{TimerId, TimerKind};

use crate::handle::CommandRequest;
use crate::ports::ControllerEvent;

/// Everything the bridge loop reacts to.
#[derive(Debug)]
pub enum BridgeEvent {
    Controller(ControllerEvent),
    TimerFired {
        alias: Alias,
        kind: TimerKind,
        timer: TimerId,
    },
    WatchdogTick,
    Reconnect,
    Command(CommandRequest),
}

/// Cloneable producer side of the queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::UnboundedSender<BridgeEvent>,
}

impl EventSender {
    /// Enqueue an event, returning `false` once the consumer is gone.
    pub fn send(&self, event: BridgeEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// The queue, owned by its single consumer.
#[derive(Debug)]
pub struct EventQueue {
    sender: EventSender,
    receiver: mpsc::UnboundedReceiver<BridgeEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: EventSender { sender },
            receiver,
        }
    }

    /// A new producer handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Wait for the next event. The queue keeps a sender of its own, so this
    /// only returns `None` if the channel was explicitly closed.
    pub async fn recv(&mut self) -> Option<BridgeEvent> {
        self.receiver.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<BridgeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Stop accepting events; already queued ones can still be drained.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
