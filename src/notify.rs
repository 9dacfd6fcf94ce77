//! Order notification dispatch.
//!
//! Checkout publishes one message carrying the full order payload plus a
//! rendered summary; delivery to the customer and the operator contact
//! (email/SMS) is an external consumer's job.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::aggregates::order::Order;
use crate::{Error, Result};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn order_placed(&self, order: &Order) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderPlaced<'a> {
    #[serde(flatten)]
    order: &'a Order,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    operator_contact: Option<&'a str>,
}

/// Human-readable order summary, the text passed on to SMS/email delivery.
pub fn order_summary(order: &Order) -> String {
    let mut lines = Vec::with_capacity(order.cart.len() + 4);
    lines.push(format!("Order {}", order.code));
    lines.push(format!("Name: {}", order.shipping.name));
    lines.push(format!("Phone: {}", order.shipping.phone));
    lines.push(format!(
        "Address: {}, {}, {}, {}, {}",
        order.shipping.address,
        order.shipping.city,
        order.shipping.state,
        order.shipping.country,
        order.shipping.postal_code,
    ));
    for line in &order.cart {
        if line.sale.is_active() {
            lines.push(format!(
                "{} ({}) - ${} (${} before) x {}",
                line.name, line.category, line.sale_price, line.price, line.quantity,
            ));
        } else {
            lines.push(format!(
                "{} ({}) - ${} x {}",
                line.name, line.category, line.price, line.quantity,
            ));
        }
    }
    lines.push(format!("Total quantity: {}", order.total_quantity));
    lines.push(format!("Total amount: ${}", order.total_amount));
    lines.push("Thank you for your order!".to_string());
    lines.join("\n")
}

/// Publishes order-placed messages to a NATS subject.
pub struct NatsNotifier {
    client: async_nats::Client,
    subject: String,
    operator_contact: Option<String>,
}

impl NatsNotifier {
    pub fn new(
        client: async_nats::Client,
        subject: impl Into<String>,
        operator_contact: Option<String>,
    ) -> Self {
        Self { client, subject: subject.into(), operator_contact }
    }
}

#[async_trait]
impl Notifier for NatsNotifier {
    async fn order_placed(&self, order: &Order) -> Result<()> {
        let payload = OrderPlaced {
            order,
            summary: order_summary(order),
            operator_contact: self.operator_contact.as_deref(),
        };
        let bytes = serde_json::to_vec(&payload).map_err(|err| Error::Notification(err.to_string()))?;
        self.client
            .publish(self.subject.clone(), bytes.into())
            .await
            .map_err(|err| Error::Notification(err.to_string()))?;
        self.client.flush().await.map_err(|err| Error::Notification(err.to_string()))?;
        tracing::info!(order = %order.code, subject = %self.subject, "order notification published");
        Ok(())
    }
}

/// Stands in when no broker is configured; dispatch succeeds without
/// sending anything.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn order_placed(&self, order: &Order) -> Result<()> {
        tracing::debug!(order = %order.code, "notification transport not configured, skipping");
        Ok(())
    }
}
