//! Checkout orchestration: cart snapshot -> order -> notification -> clear.

use std::sync::Arc;

use crate::domain::aggregates::cart::LineItem;
use crate::domain::aggregates::order::{OrderDraft, OrderLine, ShippingDetails};
use crate::domain::aggregates::Order;
use crate::notify::Notifier;
use crate::pricing;
use crate::store::cart::CartStore;
use crate::store::orders::OrderService;
use crate::{Error, Result};

/// Whether the order-placed notification went out. A failed dispatch never
/// rolls back the persisted order; it is reported here instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    Failed(String),
}

impl NotificationOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

#[derive(Clone, Debug)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub notification: NotificationOutcome,
}

pub struct CheckoutOrchestrator {
    orders: Arc<OrderService>,
    notifier: Arc<dyn Notifier>,
}

impl CheckoutOrchestrator {
    pub fn new(orders: Arc<OrderService>, notifier: Arc<dyn Notifier>) -> Self {
        Self { orders, notifier }
    }

    /// Snapshots the given lines and places the order. The caller keeps
    /// ownership of its cart; nothing here mutates it.
    ///
    /// There is no true atomicity across the steps: the order write is the
    /// commit point, and a notification failure after it is reported on the
    /// receipt rather than unwinding the order.
    pub async fn place_order(
        &self,
        items: &[LineItem],
        shipping: ShippingDetails,
    ) -> Result<CheckoutReceipt> {
        if items.is_empty() {
            return Err(Error::Validation("cart is empty".into()));
        }
        let lines: Vec<OrderLine> = items.iter().map(OrderLine::from_cart_item).collect();
        let totals = pricing::totals(&lines);
        let draft = OrderDraft {
            shipping,
            cart: lines,
            total_quantity: totals.total_quantity,
            total_amount: totals.total_amount,
        };
        let order = self.orders.create(draft).await?;
        tracing::info!(order = %order.code, amount = %order.total_amount, "order placed");

        let notification = match self.notifier.order_placed(&order).await {
            Ok(()) => NotificationOutcome::Sent,
            Err(err) => {
                tracing::warn!(order = %order.code, %err, "order placed but notification dispatch failed");
                NotificationOutcome::Failed(err.to_string())
            }
        };
        Ok(CheckoutReceipt { order, notification })
    }

    /// Full checkout over a session cart: place the order, then clear the
    /// cart. Validation and persistence failures leave the cart untouched
    /// so the customer can retry.
    pub async fn checkout(
        &self,
        cart: &mut CartStore,
        shipping: ShippingDetails,
    ) -> Result<CheckoutReceipt> {
        let receipt = self.place_order(cart.items(), shipping).await?;
        cart.clear();
        Ok(receipt)
    }
}
