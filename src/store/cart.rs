//! Session cart store: in-memory state with write-through persistence.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::domain::aggregates::cart::{Cart, LineItem};
use crate::domain::aggregates::product::Product;
use crate::pricing::Totals;

/// Fixed name of the persisted cart slot.
pub const CART_SLOT: &str = "cart.json";

/// Where the line-item list is persisted between sessions. The store only
/// sees `load` and `save` of the JSON payload, so the medium is swappable.
pub trait CartSlot: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, payload: &str) -> io::Result<()>;
}

/// A JSON file under the session directory, the file-system equivalent of a
/// browser local-storage key.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(CART_SLOT) }
    }
}

impl CartSlot for FileSlot {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, payload: &str) -> io::Result<()> {
        std::fs::write(&self.path, payload)
    }
}

/// In-memory slot for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySlot {
    payload: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartSlot for MemorySlot {
    fn load(&self) -> io::Result<Option<String>> {
        let guard = self.payload.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, payload: &str) -> io::Result<()> {
        let mut guard = self.payload.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(payload.to_string());
        Ok(())
    }
}

/// Per-session cart. Every mutation overwrites the slot with the full list
/// (last writer wins); hydration failures degrade to an empty cart and are
/// logged rather than surfaced, so callers never see an error from a cart
/// operation.
pub struct CartStore {
    cart: Cart,
    slot: Arc<dyn CartSlot>,
}

impl CartStore {
    pub fn open(slot: Arc<dyn CartSlot>) -> Self {
        let cart = match slot.load() {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<LineItem>>(&payload) {
                Ok(items) => Cart::from_items(items),
                Err(err) => {
                    tracing::warn!(%err, "discarding unparseable cart slot");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(err) => {
                tracing::warn!(%err, "failed to read cart slot");
                Cart::new()
            }
        };
        Self { cart, slot }
    }

    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn totals(&self) -> Totals {
        self.cart.totals()
    }

    pub fn add_item(&mut self, product: &Product) {
        self.cart.add_item(product);
        self.persist();
    }

    pub fn remove_item(&mut self, product_id: &str) {
        self.cart.remove_item(product_id);
        self.persist();
    }

    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) {
        self.cart.update_quantity(product_id, quantity);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    fn persist(&self) {
        let payload = match serde_json::to_string(self.cart.items()) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(%err, "failed to encode cart for persistence");
                return;
            }
        };
        if let Err(err) = self.slot.save(&payload) {
            tracing::warn!(%err, "failed to persist cart slot");
        }
    }
}
