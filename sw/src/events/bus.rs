//! Event Bus - bounded fan-out of workshop activity
//!
//! Workers and the dispatcher emit while holding the workshop mutex, so
//! emitting must never wait on a consumer. A broadcast channel gives exactly
//! that: a full channel overwrites its oldest entries and the slow receiver
//! sees a lag count instead of stalling the sender.

use tokio::sync::broadcast;
use tracing::debug;

use super::types::WorkshopEvent;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

pub struct EventBus {
    tx: broadcast::Sender<WorkshopEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Fire-and-forget; dropped when nobody is subscribed
    pub fn emit(&self, event: WorkshopEvent) {
        debug!(event_type = event.event_type(), "EventBus::emit");
        let _ = self.tx.send(event);
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<WorkshopEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_ok() {
        let bus = EventBus::new(4);
        bus.emit(WorkshopEvent::ShutdownRequested);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(WorkshopEvent::ReindeerReturned { id: 0, waiting: 1 });
        bus.emit(WorkshopEvent::ReindeerReturned { id: 1, waiting: 2 });

        assert_eq!(rx.recv().await.unwrap(), WorkshopEvent::ReindeerReturned { id: 0, waiting: 1 });
        assert_eq!(rx.recv().await.unwrap(), WorkshopEvent::ReindeerReturned { id: 1, waiting: 2 });
    }

    #[tokio::test]
    async fn test_full_channel_lags_instead_of_blocking() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for id in 0..5 {
            bus.emit(WorkshopEvent::ElfNeedsHelp { id, waiting: 1 });
        }

        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(n)) => assert_eq!(n, 3),
            other => panic!("expected lag, got {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap(), WorkshopEvent::ElfNeedsHelp { id: 3, waiting: 1 });
    }
}
