//! Best-effort order event notifications.
//!
//! The engine emits an [`OrderEvent`] after every order creation and status
//! transition. Delivery runs on its own task; failures are logged and never
//! reach the caller.

use crate::model::{CustomerId, OrderId, OrderStatus, StallId};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderEvent {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub stall_id: StallId,
    pub new_status: OrderStatus,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    Closed,
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: OrderEvent) -> Result<(), NotifyError>;
}

/// Writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, event: OrderEvent) -> Result<(), NotifyError> {
        info!(
            order_id = %event.order_id,
            customer_id = %event.customer_id,
            stall_id = %event.stall_id,
            status = %event.new_status,
            "Order event"
        );
        Ok(())
    }
}

/// Forwards events into a channel, e.g. for a delivery worker.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<OrderEvent>,
}

impl ChannelSink {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<OrderEvent>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn deliver(&self, event: OrderEvent) -> Result<(), NotifyError> {
        self.sender.send(event).await.map_err(|_| NotifyError::Closed)
    }
}

/// Fire-and-forget dispatcher around a sink.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Spawns delivery of `event` and returns immediately.
    pub fn dispatch(&self, event: OrderEvent) {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.deliver(event).await {
                warn!(order_id = %event.order_id, status = %event.new_status, error = %e, "Notification failed");
            }
        });
    }
}
