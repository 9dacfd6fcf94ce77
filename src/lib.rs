//! Meridian Storefront
//!
//! Storefront application core: product catalog, per-session shopping cart,
//! checkout with order notification, and administrative CRUD for products,
//! orders, and operator credentials.
//!
//! ## Components
//! - Pricing engine: sale-adjusted unit prices and cart/order totals
//! - Cart store: per-session line items with write-through persistence
//! - Catalog store: cached product list over the remote collection
//! - Order lifecycle: pending/completed transitions, newest-first listing
//! - Checkout orchestrator: cart snapshot, order creation, notification

pub mod checkout;
pub mod domain;
pub mod notify;
pub mod pricing;
pub mod store;

use thiserror::Error as ThisError;

pub use checkout::{CheckoutOrchestrator, CheckoutReceipt, NotificationOutcome};
pub use domain::aggregates::{Admin, Cart, LineItem, Order, OrderDraft, OrderStatus, Product};
pub use domain::value_objects::{Money, OrderCode, Sale};
pub use pricing::Totals;
pub use store::{AdminDirectory, CartStore, CatalogStore, OrderService};

// =============================================================================
// Error Types
// =============================================================================

#[derive(ThisError, Debug)]
pub enum Error {
    /// Missing or invalid input, including order totals that diverge from
    /// the pricing-engine recomputation.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid username or password")]
    InvalidCredentials,

    /// Network or database failure on a document-store call.
    #[error("document store error: {0}")]
    Remote(String),

    /// Notification dispatch failure. The checkout orchestrator downgrades
    /// this to a warning on the receipt once the order is persisted.
    #[error("notification dispatch failed: {0}")]
    Notification(String),
}

pub type Result<T> = std::result::Result<T, Error>;
