use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// In-process domain events, consumed by `process_events`. Emission is
/// best-effort: a full channel never fails the originating request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StockMovementRecorded {
        part_id: Uuid,
        movement_id: Uuid,
        movement_type: String,
        quantity: Decimal,
        new_quantity: Decimal,
    },
    LowStockDetected {
        part_id: Uuid,
        current_quantity: Decimal,
        minimum_quantity: Decimal,
    },
    ReplenishmentOrderCreated {
        order_id: Uuid,
        supplier_id: Uuid,
        source: String,
        item_count: usize,
    },
    ReplenishmentOrderConfirmed {
        order_id: Uuid,
        confirmed_at: DateTime<Utc>,
    },
    ReplenishmentOrderShipped {
        order_id: Uuid,
        tracking_code: Option<String>,
    },
    ReplenishmentOrderReceived {
        order_id: Uuid,
        movements_posted: usize,
    },
    ReplenishmentOrderCancelled {
        order_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget emission used after commits; drops the event with a
    /// warning when the channel is gone rather than failing the request.
    pub async fn emit(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Alerting and notification
/// integrations hang off this loop in the wider product; this core only
/// records them.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::LowStockDetected {
                part_id,
                current_quantity,
                minimum_quantity,
            } => {
                warn!(
                    %part_id,
                    %current_quantity,
                    %minimum_quantity,
                    "Part fell below its minimum quantity"
                );
            }
            other => {
                info!(event = ?other, "Domain event");
            }
        }
    }
    info!("Event channel closed; processor exiting");
}
