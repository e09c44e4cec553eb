//! Order notifications.
//!
//! Notifiers run after the order has committed. A failed notification is logged and never
//! affects the order.

use async_trait::async_trait;
use mockall::automock;
use nutbasket::order_numbers::OrderNumber;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::domain::orders::records::OrderUuid;

/// Sent once an order has been placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPlaced {
    pub order_uuid: OrderUuid,
    pub order_number: OrderNumber,
}

/// Something that wants to hear about new orders.
#[automock]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_placed(&self, event: &OrderPlaced) -> Result<(), NotificationError>;
}

/// Writes a log line per order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn order_placed(&self, event: &OrderPlaced) -> Result<(), NotificationError> {
        info!(
            order_uuid = %event.order_uuid,
            order_number = %event.order_number,
            "order placed"
        );

        Ok(())
    }
}

/// POSTs each order as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    http: Client,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl OrderNotifier for WebhookNotifier {
    async fn order_placed(&self, event: &OrderPlaced) -> Result<(), NotificationError> {
        let response = self.http.post(&self.url).json(event).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(NotificationError::UnexpectedResponse(format!(
                "webhook failed with status {status}: {text}"
            )));
        }

        Ok(())
    }
}

/// Errors raised while delivering a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The receiver answered with a non-2xx status.
    #[error("unexpected response from webhook: {0}")]
    UnexpectedResponse(String),
}
