//! Document-store access.
//!
//! The catalog, order, and admin services reach their backing store through
//! [`Collection`]: plain CRUD over identified documents, last-write-wins,
//! no version field and no conflict detection. `InMemoryCollection` is the
//! in-process implementation; a remote document-database client can take
//! its place without touching the services.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;

#[async_trait]
pub trait Collection<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    async fn list(&self) -> Result<Vec<T>>;
    async fn get(&self, id: &str) -> Result<Option<T>>;
    /// Inserts, overwriting any document already under this id.
    async fn insert(&self, id: &str, doc: T) -> Result<()>;
    /// Replaces an existing document; `false` when the id is unknown.
    async fn replace(&self, id: &str, doc: T) -> Result<bool>;
    /// Removes a document; `false` when the id is unknown.
    async fn remove(&self, id: &str) -> Result<bool>;
}

/// Insertion-ordered in-process collection.
pub struct InMemoryCollection<T> {
    docs: RwLock<Vec<(String, T)>>,
}

impl<T> InMemoryCollection<T> {
    pub fn new() -> Self {
        Self { docs: RwLock::new(Vec::new()) }
    }
}

impl<T> Default for InMemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Collection<T> for InMemoryCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn list(&self) -> Result<Vec<T>> {
        Ok(self.docs.read().await.iter().map(|(_, doc)| doc.clone()).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<T>> {
        Ok(self
            .docs
            .read()
            .await
            .iter()
            .find(|(key, _)| key.as_str() == id)
            .map(|(_, doc)| doc.clone()))
    }

    async fn insert(&self, id: &str, doc: T) -> Result<()> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|(key, _)| key.as_str() == id) {
            Some(slot) => slot.1 = doc,
            None => docs.push((id.to_string(), doc)),
        }
        Ok(())
    }

    async fn replace(&self, id: &str, doc: T) -> Result<bool> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|(key, _)| key.as_str() == id) {
            Some(slot) => {
                slot.1 = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|(key, _)| key.as_str() != id);
        Ok(docs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_crud_round_trip() {
        let docs = InMemoryCollection::new();
        docs.insert("a", 1u32).await.unwrap();
        docs.insert("b", 2u32).await.unwrap();
        assert_eq!(docs.get("a").await.unwrap(), Some(1));
        assert_eq!(docs.list().await.unwrap(), vec![1, 2]);

        assert!(docs.replace("a", 10).await.unwrap());
        assert!(!docs.replace("missing", 10).await.unwrap());
        assert_eq!(docs.get("a").await.unwrap(), Some(10));

        assert!(docs.remove("a").await.unwrap());
        assert!(!docs.remove("a").await.unwrap());
        assert_eq!(docs.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_is_last_write_wins() {
        let docs = InMemoryCollection::new();
        docs.insert("a", 1u32).await.unwrap();
        docs.insert("a", 2u32).await.unwrap();
        assert_eq!(docs.list().await.unwrap(), vec![2]);
    }
}
