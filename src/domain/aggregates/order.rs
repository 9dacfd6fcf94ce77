//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::cart::LineItem;
use crate::domain::value_objects::{Money, OrderCode, Sale};
use crate::pricing::{self, PricedLine, Totals};

/// Order status. Transitions are bidirectional; deletion is valid from
/// either state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Snapshot line captured at submission: the cart fields plus the
/// sale-adjusted unit price actually charged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub image: String,
    pub price: Money,
    #[serde(default)]
    pub sale: Sale,
    pub sale_price: Money,
    pub quantity: u32,
}

impl OrderLine {
    pub fn from_cart_item(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            image: item.image.clone(),
            price: item.price,
            sale: item.sale,
            sale_price: pricing::effective_price(item.price, item.sale),
            quantity: item.quantity,
        }
    }
}

impl PricedLine for OrderLine {
    fn unit_price(&self) -> Money { self.price }
    fn sale(&self) -> Sale { self.sale }
    fn quantity(&self) -> u32 { self.quantity }
}

/// Shipping and contact details collected at checkout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub country: String,
    #[validate(length(min = 1))]
    pub postal_code: String,
}

impl ShippingDetails {
    fn first_missing(&self) -> Option<&'static str> {
        let fields: [(&'static str, &String); 8] = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("postalCode", &self.postal_code),
        ];
        fields.iter().find(|(_, value)| value.trim().is_empty()).map(|(label, _)| *label)
    }
}

/// Everything needed to create an order. The supplied totals are re-verified
/// against the pricing engine before the order is accepted.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    pub cart: Vec<OrderLine>,
    pub total_quantity: u32,
    pub total_amount: Money,
}

/// Placed order. The cart snapshot and totals are immutable once written;
/// only `status` changes afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderId")]
    pub code: OrderCode,
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    pub cart: Vec<OrderLine>,
    pub total_quantity: u32,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Validation gate: shipping fields present, at least one line, and the
    /// supplied totals equal to the pricing-engine recomputation over the
    /// snapshot.
    pub fn from_draft(code: OrderCode, draft: OrderDraft) -> Result<Self, OrderDraftError> {
        if let Some(field) = draft.shipping.first_missing() {
            return Err(OrderDraftError::MissingField(field));
        }
        if draft.cart.is_empty() {
            return Err(OrderDraftError::EmptyCart);
        }
        let recomputed = pricing::totals(&draft.cart);
        let supplied = Totals {
            total_quantity: draft.total_quantity,
            total_amount: draft.total_amount,
        };
        if recomputed != supplied {
            return Err(OrderDraftError::TotalsMismatch { recomputed, supplied });
        }
        Ok(Self {
            code,
            shipping: draft.shipping,
            cart: draft.cart,
            total_quantity: draft.total_quantity,
            total_amount: draft.total_amount,
            status: OrderStatus::default(),
            created_at: Utc::now(),
        })
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}

#[derive(Debug, Clone)]
pub enum OrderDraftError {
    MissingField(&'static str),
    EmptyCart,
    TotalsMismatch { recomputed: Totals, supplied: Totals },
}

impl std::error::Error for OrderDraftError {}
impl std::fmt::Display for OrderDraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {}", field),
            Self::EmptyCart => write!(f, "order has no line items"),
            Self::TotalsMismatch { recomputed, supplied } => write!(
                f,
                "supplied totals ({} items, {}) do not match the cart snapshot ({} items, {})",
                supplied.total_quantity,
                supplied.total_amount,
                recomputed.total_quantity,
                recomputed.total_amount,
            ),
        }
    }
}
