//! Consumer-facing handle: turns intents into queued commands and awaits
//! their reply.

use tokio::sync::oneshot;

use unibridge_domain::alias::Alias;
use unibridge_domain::circuit::CircuitView;
use unibridge_domain::error::{BridgeError, NotFoundError};

use crate::event_queue::{BridgeEvent, EventSender};

/// What the consumer asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    SetOn(bool),
    /// Brightness of an analog output, `0..=100`.
    SetLevel(f64),
    Read,
    Identify,
}

/// A queued consumer intent with its reply channel.
#[derive(Debug)]
pub struct CommandRequest {
    pub alias: Alias,
    pub intent: Intent,
    pub reply: oneshot::Sender<Result<CircuitView, BridgeError>>,
}

/// Cloneable entry point for consumers.
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    sender: EventSender,
}

impl BridgeHandle {
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        Self { sender }
    }

    /// Turn an output on or off.
    ///
    /// # Errors
    ///
    /// Fails when the circuit is unknown or is an input, when the controller
    /// is unreachable, or when the bridge has stopped.
    pub async fn set_on(&self, alias: &str, on: bool) -> Result<CircuitView, BridgeError> {
        self.request(alias, Intent::SetOn(on)).await
    }

    /// Set the brightness of an analog output.
    ///
    /// # Errors
    ///
    /// Fails when the circuit is unknown or not an analog output, when the
    /// controller is unreachable, or when the bridge has stopped.
    pub async fn set_level(&self, alias: &str, level: f64) -> Result<CircuitView, BridgeError> {
        self.request(alias, Intent::SetLevel(level)).await
    }

    /// Current state; relays and digital outputs are read back first.
    ///
    /// # Errors
    ///
    /// Fails when the circuit is unknown, when the read fails, or when the
    /// bridge has stopped.
    pub async fn read(&self, alias: &str) -> Result<CircuitView, BridgeError> {
        self.request(alias, Intent::Read).await
    }

    /// Log the circuit's room and alias.
    ///
    /// # Errors
    ///
    /// Fails when the circuit is unknown or the bridge has stopped.
    pub async fn identify(&self, alias: &str) -> Result<CircuitView, BridgeError> {
        self.request(alias, Intent::Identify).await
    }

    async fn request(&self, alias: &str, intent: Intent) -> Result<CircuitView, BridgeError> {
        let alias = Alias::new(alias).map_err(|_| NotFoundError {
            alias: alias.to_string(),
        })?;
        let (reply, response) = oneshot::channel();
        let request = CommandRequest {
            alias,
            intent,
            reply,
        };
        if !self.sender.send(BridgeEvent::Command(request)) {
            return Err(BridgeError::Stopped);
        }
        response.await.unwrap_or(Err(BridgeError::Stopped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_queue::EventQueue;

    #[tokio::test]
    async fn should_reject_invalid_alias_without_queueing() {
        let mut queue = EventQueue::new();
        let handle = BridgeHandle::new(queue.sender());
        let result = handle.read("two words").await;
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
        assert!(queue.try_recv().is_none());
    }

    #[tokio::test]
    async fn should_report_stopped_bridge() {
        let queue = EventQueue::new();
        let handle = BridgeHandle::new(queue.sender());
        drop(queue);
        let result = handle.set_on("hall", true).await;
        assert!(matches!(result, Err(BridgeError::Stopped)));
    }

    #[tokio::test]
    async fn should_report_dropped_reply() {
        let mut queue = EventQueue::new();
        let handle = BridgeHandle::new(queue.sender());
        let consumer = tokio::spawn(async move {
            // take the request and drop it without answering
            let event = queue.recv().await;
            assert!(matches!(event, Some(BridgeEvent::Command(_))));
        });
        let result = handle.identify("hall").await;
        assert!(matches!(result, Err(BridgeError::Stopped)));
        consumer.await.unwrap();
    }

    #[tokio::test]
    async fn should_forward_intent_and_alias() {
        let mut queue = EventQueue::new();
        let handle = BridgeHandle::new(queue.sender());
        let consumer = tokio::spawn(async move {
            let Some(BridgeEvent::Command(request)) = queue.recv().await else {
                panic!("expected a command");
            };
            assert_eq!(request.alias.as_str(), "light1");
            assert_eq!(request.intent, Intent::SetLevel(40.0));
            let _ = request.reply.send(Err(BridgeError::Stopped));
        });
        let result = handle.set_level("light1", 40.0).await;
        assert!(matches!(result, Err(BridgeError::Stopped)));
        consumer.await.unwrap();
    }
}
