//! Catalog store: the product list, mirrored from the remote collection.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::aggregates::product::{Product, ProductDraft, ProductUpdate};
use crate::store::documents::Collection;
use crate::{Error, Result};

/// Products fetched from the remote collection with a locally cached
/// snapshot. Mutations are two-phase: the remote write happens first and
/// the cache is only touched once it reports success, so a failed call
/// leaves local state exactly as it was.
pub struct CatalogStore {
    remote: Arc<dyn Collection<Product>>,
    cached: RwLock<Vec<Product>>,
}

impl CatalogStore {
    pub fn new(remote: Arc<dyn Collection<Product>>) -> Self {
        Self { remote, cached: RwLock::new(Vec::new()) }
    }

    /// Refreshes the local snapshot from the remote collection.
    pub async fn hydrate(&self) -> Result<()> {
        let products = self.remote.list().await?;
        *self.cached.write().await = products;
        Ok(())
    }

    /// Cached snapshot; [`CatalogStore::hydrate`] refreshes it.
    pub async fn list(&self) -> Vec<Product> {
        self.cached.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<Product> {
        self.remote.get(id).await?.ok_or(Error::NotFound("product"))
    }

    pub async fn add(&self, draft: ProductDraft) -> Result<Product> {
        if draft.price.is_negative() {
            return Err(Error::Validation("price must not be negative".into()));
        }
        let product = Product::create(draft);
        self.remote.insert(&product.id, product.clone()).await?;
        self.apply_upsert(product.clone()).await;
        Ok(product)
    }

    pub async fn update(&self, id: &str, update: ProductUpdate) -> Result<Product> {
        if let Some(price) = update.price {
            if price.is_negative() {
                return Err(Error::Validation("price must not be negative".into()));
            }
        }
        let mut product = self.get(id).await?;
        product.apply(update);
        if !self.remote.replace(id, product.clone()).await? {
            return Err(Error::NotFound("product"));
        }
        self.apply_upsert(product.clone()).await;
        Ok(product)
    }

    /// Deletion is not cascaded: orders keep the line-item snapshots they
    /// captured.
    pub async fn remove(&self, id: &str) -> Result<()> {
        if !self.remote.remove(id).await? {
            return Err(Error::NotFound("product"));
        }
        self.cached.write().await.retain(|p| p.id != id);
        Ok(())
    }

    /// Rating upsert: one rating per user, last write wins.
    pub async fn rate(&self, id: &str, user_id: &str, rating: u8) -> Result<Product> {
        let mut product = self.get(id).await?;
        product.rate(user_id, rating).map_err(|err| Error::Validation(err.to_string()))?;
        if !self.remote.replace(id, product.clone()).await? {
            return Err(Error::NotFound("product"));
        }
        self.apply_upsert(product.clone()).await;
        Ok(product)
    }

    pub async fn comment(&self, id: &str, user: &str, text: &str) -> Result<Product> {
        if user.trim().is_empty() || text.trim().is_empty() {
            return Err(Error::Validation("comment user and text must not be empty".into()));
        }
        let mut product = self.get(id).await?;
        product.add_comment(user, text);
        if !self.remote.replace(id, product.clone()).await? {
            return Err(Error::NotFound("product"));
        }
        self.apply_upsert(product.clone()).await;
        Ok(product)
    }

    /// Local half of the two-phase write. Infallible vector surgery, so a
    /// success that raced a cache refresh can be retried without re-issuing
    /// the remote call.
    async fn apply_upsert(&self, product: Product) {
        let mut cached = self.cached.write().await;
        match cached.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product,
            None => cached.push(product),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Money, Sale};
    use crate::store::documents::InMemoryCollection;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn draft(name: &str, price: i64) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            category: "clothing".into(),
            subcategory: "shirts".into(),
            price: Money::new(Decimal::from(price)),
            sale: Sale::NONE,
            image: format!("/img/{}.jpg", name),
            description: "test".into(),
        }
    }

    /// Delegates to an in-memory collection until `fail` is set.
    struct FlakyCollection {
        inner: InMemoryCollection<Product>,
        fail: AtomicBool,
    }

    impl FlakyCollection {
        fn new() -> Self {
            Self { inner: InMemoryCollection::new(), fail: AtomicBool::new(false) }
        }

        fn check(&self) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Remote("store unreachable".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Collection<Product> for FlakyCollection {
        async fn list(&self) -> Result<Vec<Product>> {
            self.check()?;
            self.inner.list().await
        }
        async fn get(&self, id: &str) -> Result<Option<Product>> {
            self.check()?;
            self.inner.get(id).await
        }
        async fn insert(&self, id: &str, doc: Product) -> Result<()> {
            self.check()?;
            self.inner.insert(id, doc).await
        }
        async fn replace(&self, id: &str, doc: Product) -> Result<bool> {
            self.check()?;
            self.inner.replace(id, doc).await
        }
        async fn remove(&self, id: &str) -> Result<bool> {
            self.check()?;
            self.inner.remove(id).await
        }
    }

    #[tokio::test]
    async fn test_add_updates_remote_then_cache() {
        let catalog = CatalogStore::new(Arc::new(InMemoryCollection::<Product>::new()));
        let product = catalog.add(draft("shirt", 80)).await.unwrap();
        assert_eq!(catalog.list().await.len(), 1);
        assert_eq!(catalog.get(&product.id).await.unwrap().name, "shirt");
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let catalog = CatalogStore::new(Arc::new(InMemoryCollection::<Product>::new()));
        let err = catalog.add(draft("shirt", -5)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(catalog.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let catalog = CatalogStore::new(Arc::new(InMemoryCollection::<Product>::new()));
        let product = catalog.add(draft("shirt", 80)).await.unwrap();

        let updated = catalog
            .update(
                &product.id,
                ProductUpdate { price: Some(Money::new(Decimal::from(60))), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, Money::new(Decimal::from(60)));
        assert_eq!(catalog.list().await[0].price, Money::new(Decimal::from(60)));

        catalog.remove(&product.id).await.unwrap();
        assert!(catalog.list().await.is_empty());
        assert!(matches!(catalog.remove(&product.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_cache_untouched() {
        let remote = Arc::new(FlakyCollection::new());
        let catalog = CatalogStore::new(remote.clone());
        let product = catalog.add(draft("shirt", 80)).await.unwrap();

        remote.fail.store(true, Ordering::SeqCst);
        let err = catalog
            .update(
                &product.id,
                ProductUpdate { price: Some(Money::new(Decimal::from(1))), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote(_)));

        let cached = catalog.list().await;
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].price, Money::new(Decimal::from(80)));
    }

    #[tokio::test]
    async fn test_rate_and_comment_round_trip() {
        let catalog = CatalogStore::new(Arc::new(InMemoryCollection::<Product>::new()));
        let product = catalog.add(draft("shirt", 80)).await.unwrap();

        catalog.rate(&product.id, "user-1", 5).await.unwrap();
        let rated = catalog.rate(&product.id, "user-1", 3).await.unwrap();
        assert_eq!(rated.ratings.len(), 1);
        assert_eq!(rated.ratings.get("user-1"), Some(&3));

        let commented = catalog.comment(&product.id, "ada", "runs small").await.unwrap();
        assert_eq!(commented.comments.len(), 1);
        assert!(matches!(
            catalog.comment(&product.id, "ada", "  ").await,
            Err(Error::Validation(_))
        ));
    }
}
