//! Stores: session cart, catalog, orders, and admin credentials.
pub mod admins;
pub mod cart;
pub mod catalog;
pub mod documents;
pub mod orders;

pub use admins::{AdminDirectory, AdminSummary};
pub use cart::{CartSlot, CartStore, FileSlot, MemorySlot};
pub use catalog::CatalogStore;
pub use documents::{Collection, InMemoryCollection};
pub use orders::{OrderFilter, OrderService};
