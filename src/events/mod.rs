use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Wrapper around the event channel's sending half.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
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

/// Domain events emitted by the core services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Ledger events
    MovementApplied {
        movement_id: Uuid,
        product_id: Uuid,
        movement_type: String,
        quantity: i32,
    },
    StockStatusChanged {
        product_id: Uuid,
        location_id: Uuid,
        old_status: String,
        new_status: String,
    },
    RecordProvisioned {
        product_id: Uuid,
        location_id: Uuid,
    },

    // Alert lifecycle events
    AlertRaised {
        alert_id: Uuid,
        alert_type: String,
        priority: String,
    },
    AlertApproved(Uuid),
    AlertRejected(Uuid),
    AlertScheduled {
        alert_id: Uuid,
        send_at: chrono::DateTime<chrono::Utc>,
    },
    AlertSent(Uuid),
    AlertDeliveryFailed {
        alert_id: Uuid,
        attempts: u32,
    },
}

/// Drains the event channel, tracing each event. A dropped channel ends the
/// loop cleanly at shutdown.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::AlertDeliveryFailed { alert_id, attempts } => {
                warn!(alert_id = %alert_id, attempts, "Alert delivery failed");
            }
            other => {
                info!("Event: {:?}", other);
            }
        }
    }
    info!("Event channel closed; processor stopping");
}
