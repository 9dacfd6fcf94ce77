//! Product Aggregate

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::{Money, Sale};
use crate::pricing;

/// Catalog product. Ratings are keyed by user id, which makes the
/// one-rating-per-user invariant structural; the wire representation stays
/// a list of `{userId, rating}` entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub price: Money,
    #[serde(default)]
    pub sale: Sale,
    pub image: String,
    pub description: String,
    #[serde(default, with = "rating_entries")]
    pub ratings: BTreeMap<String, u8>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub user: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Fields accepted when an admin submits a new product.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub subcategory: String,
    pub price: Money,
    #[serde(default)]
    pub sale: Sale,
    #[validate(length(min = 1))]
    pub image: String,
    #[validate(length(min = 1))]
    pub description: String,
}

/// Partial edit; absent fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub price: Option<Money>,
    pub sale: Option<Sale>,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl Product {
    pub fn create(draft: ProductDraft) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: draft.name,
            category: draft.category,
            subcategory: draft.subcategory,
            price: draft.price,
            sale: draft.sale,
            image: draft.image,
            description: draft.description,
            ratings: BTreeMap::new(),
            comments: Vec::new(),
        }
    }

    pub fn apply(&mut self, update: ProductUpdate) {
        if let Some(name) = update.name { self.name = name; }
        if let Some(category) = update.category { self.category = category; }
        if let Some(subcategory) = update.subcategory { self.subcategory = subcategory; }
        if let Some(price) = update.price { self.price = price; }
        if let Some(sale) = update.sale { self.sale = sale; }
        if let Some(image) = update.image { self.image = image; }
        if let Some(description) = update.description { self.description = description; }
    }

    /// Upserts this user's rating; a later rating replaces the earlier one.
    pub fn rate(&mut self, user_id: impl Into<String>, rating: u8) -> Result<(), RatingError> {
        if !(1..=5).contains(&rating) {
            return Err(RatingError::OutOfRange(rating));
        }
        self.ratings.insert(user_id.into(), rating);
        Ok(())
    }

    /// Comments are append-only.
    pub fn add_comment(&mut self, user: impl Into<String>, text: impl Into<String>) {
        self.comments.push(Comment { user: user.into(), text: text.into(), date: Utc::now() });
    }

    pub fn effective_price(&self) -> Money {
        pricing::effective_price(self.price, self.sale)
    }

    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: u32 = self.ratings.values().map(|r| u32::from(*r)).sum();
        Some(f64::from(sum) / self.ratings.len() as f64)
    }
}

#[derive(Debug, Clone)] pub enum RatingError { OutOfRange(u8) }
impl std::error::Error for RatingError {}
impl std::fmt::Display for RatingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::OutOfRange(r) => write!(f, "rating must be between 1 and 5, got {}", r) }
    }
}

/// The rating map serializes as the wire-facing list of entries.
mod rating_entries {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Entry {
        user_id: String,
        rating: u8,
    }

    pub fn serialize<S: Serializer>(map: &BTreeMap<String, u8>, ser: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<Entry> = map
            .iter()
            .map(|(user_id, rating)| Entry { user_id: user_id.clone(), rating: *rating })
            .collect();
        entries.serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<BTreeMap<String, u8>, D::Error> {
        let entries = Vec::<Entry>::deserialize(de)?;
        Ok(entries.into_iter().map(|e| (e.user_id, e.rating)).collect())
    }
}
