use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Events emitted by the domain services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    MaterialCreated(Uuid),
    MaterialUpdated(Uuid),
    MaterialDeleted(Uuid),
    PriceChanged {
        material_id: Uuid,
        old_price: Option<Decimal>,
        new_price: Decimal,
    },
    RequestSubmitted(Uuid),
    RequestApproved(Uuid),
    RequestRejected(Uuid),
    HistoryImported {
        material_id: Uuid,
        entries: usize,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Integrations that react
/// to domain events hook in here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::PriceChanged {
                material_id,
                old_price,
                new_price,
            } => {
                info!(
                    material_id = %material_id,
                    old_price = ?old_price,
                    new_price = %new_price,
                    "Price changed"
                );
            }
            other => debug!(event = ?other, "Event processed"),
        }
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender.send(Event::MaterialCreated(Uuid::new_v4())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn events_round_trip_through_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender.send(Event::RequestSubmitted(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::RequestSubmitted(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
