//! Order lifecycle management.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::aggregates::order::{Order, OrderDraft, OrderStatus};
use crate::domain::value_objects::OrderCode;
use crate::store::documents::Collection;
use crate::{Error, Result};

const MAX_CODE_ATTEMPTS: usize = 8;

/// List filter for the admin panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderFilter {
    #[default]
    All,
    Pending,
    Completed,
}

pub struct OrderService {
    orders: Arc<dyn Collection<Order>>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn Collection<Order>>) -> Self {
        Self { orders }
    }

    /// Creates an order from a draft under a code checked unique against
    /// the collection. The draft's totals must match the pricing-engine
    /// recomputation over its cart snapshot.
    pub async fn create(&self, draft: OrderDraft) -> Result<Order> {
        let code = self.unique_code().await?;
        let order = Order::from_draft(code, draft).map_err(|err| Error::Validation(err.to_string()))?;
        self.orders.insert(order.code.as_str(), order.clone()).await?;
        Ok(order)
    }

    async fn unique_code(&self) -> Result<OrderCode> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = OrderCode::generate();
            if self.orders.get(code.as_str()).await?.is_none() {
                return Ok(code);
            }
        }
        Err(Error::Remote("could not allocate a unique order code".into()))
    }

    pub async fn get(&self, code: &str) -> Result<Order> {
        self.orders.get(code).await?.ok_or(Error::NotFound("order"))
    }

    /// `pending <-> completed`; either direction is valid and the cart
    /// snapshot is untouched.
    pub async fn set_status(&self, code: &str, status: OrderStatus) -> Result<Order> {
        let mut order = self.get(code).await?;
        order.set_status(status);
        if !self.orders.replace(code, order.clone()).await? {
            return Err(Error::NotFound("order"));
        }
        Ok(order)
    }

    /// Deleting an unknown code reports not-found so callers can tell
    /// "already gone" apart from "removed".
    pub async fn delete(&self, code: &str) -> Result<()> {
        if !self.orders.remove(code).await? {
            return Err(Error::NotFound("order"));
        }
        Ok(())
    }

    /// Newest first.
    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut orders = self.orders.list().await?;
        orders.retain(|order| match filter {
            OrderFilter::All => true,
            OrderFilter::Pending => order.status == OrderStatus::Pending,
            OrderFilter::Completed => order.status == OrderStatus::Completed,
        });
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::order::{OrderLine, ShippingDetails};
    use crate::domain::value_objects::{Money, Sale};
    use crate::pricing;
    use crate::store::documents::InMemoryCollection;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+15550100".into(),
            address: "12 Analytical Way".into(),
            city: "London".into(),
            state: "LDN".into(),
            country: "UK".into(),
            postal_code: "N1 9GU".into(),
        }
    }

    fn draft() -> OrderDraft {
        let line = OrderLine {
            product_id: "p1".into(),
            name: "Linen Shirt".into(),
            category: "clothing".into(),
            image: "/img/shirt.jpg".into(),
            price: Money::new(Decimal::from(100)),
            sale: Sale::new(10).unwrap(),
            sale_price: Money::new(Decimal::from(90)),
            quantity: 2,
        };
        let lines = vec![line];
        let totals = pricing::totals(&lines);
        OrderDraft {
            shipping: shipping(),
            cart: lines,
            total_quantity: totals.total_quantity,
            total_amount: totals.total_amount,
        }
    }

    fn service() -> (OrderService, Arc<InMemoryCollection<Order>>) {
        let collection = Arc::new(InMemoryCollection::new());
        (OrderService::new(collection.clone()), collection)
    }

    #[tokio::test]
    async fn test_create_assigns_code_and_persists() {
        let (service, _) = service();
        let order = service.create(draft()).await.unwrap();
        assert!(order.code.as_str().starts_with("ORDER-"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(service.get(order.code.as_str()).await.unwrap().total_quantity, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_totals() {
        let (service, collection) = service();
        let mut bad = draft();
        bad.total_amount = Money::new(Decimal::from(1));
        assert!(matches!(service.create(bad).await, Err(Error::Validation(_))));
        assert!(collection.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_transitions_are_bidirectional() {
        let (service, _) = service();
        let order = service.create(draft()).await.unwrap();
        let code = order.code.as_str();

        let completed = service.set_status(code, OrderStatus::Completed).await.unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        let reverted = service.set_status(code, OrderStatus::Pending).await.unwrap();
        assert_eq!(reverted.status, OrderStatus::Pending);
        assert_eq!(reverted.cart, order.cart);
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let (service, _) = service();
        assert!(matches!(
            service.set_status("ORDER-MISSING", OrderStatus::Completed).await,
            Err(Error::NotFound("order"))
        ));
        assert!(matches!(service.delete("ORDER-MISSING").await, Err(Error::NotFound("order"))));
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let (service, _) = service();
        let order = service.create(draft()).await.unwrap();
        service.delete(order.code.as_str()).await.unwrap();
        assert!(matches!(
            service.delete(order.code.as_str()).await,
            Err(Error::NotFound("order"))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts_newest_first() {
        let (service, collection) = service();

        let mut older = service.create(draft()).await.unwrap();
        older.created_at -= Duration::hours(2);
        collection.replace(older.code.as_str(), older.clone()).await.unwrap();

        let newer = service.create(draft()).await.unwrap();
        service.set_status(newer.code.as_str(), OrderStatus::Completed).await.unwrap();

        let all = service.list(OrderFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].code, newer.code);
        assert_eq!(all[1].code, older.code);

        let pending = service.list(OrderFilter::Pending).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].code, older.code);

        let completed = service.list(OrderFilter::Completed).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].code, newer.code);
    }
}
