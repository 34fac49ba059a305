//! # Register Events
//!
//! Notifications other parts of the register subscribe to (toasts, the
//! product grid, the sales dashboard).
//!
//! ```text
//! TransactionSubmitter ──┐
//! StockValidator ────────┼──► EventBus (tokio broadcast) ──► subscribers
//! refresh task ──────────┘
//! ```
//!
//! Publishing never fails: with no subscribers the event is dropped.

use kahera_core::{Money, StockIssue};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Default channel capacity. Slow subscribers lag rather than block.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Something the rest of the register may react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PosEvent {
    /// A sale was confirmed by the backend.
    TransactionCompleted {
        transaction_id: String,
        transaction_number: String,
        total: Money,
    },

    /// A sale was refused or could not be sent.
    TransactionFailed { message: String },

    /// The product catalog was reloaded.
    InventoryRefreshed { product_count: usize },

    /// The cart no longer matches inventory.
    StockDrift { issues: Vec<StockIssue> },
}

/// Broadcast bus for [`PosEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PosEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        EventBus { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PosEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: PosEvent) {
        trace!(?event, "Publishing event");
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
