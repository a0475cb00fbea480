//! Book listing and purchase records

use serde::{Deserialize, Serialize};

use crate::amount::{as_string, Amount};
use crate::ids::{Address, BookId};

/// A listed work.
///
/// `author`, `id` and `created_at` never change after listing. Removal only
/// clears `is_available`; the record stays so settled purchases keep a
/// valid reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    /// Opaque pointer into content-addressed storage
    pub content_reference: String,
    pub description: Option<String>,
    pub cover_reference: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Minimum payment accepted, smallest unit
    #[serde(with = "as_string")]
    pub price: Amount,
    pub royalty_percentage: u8,
    pub author: Address,
    pub is_available: bool,
    pub total_sales: u64,
    /// Unix milliseconds
    pub created_at: i64,
}

/// Author-supplied fields for a new listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub content_reference: String,
    #[serde(with = "as_string")]
    pub price: Amount,
    pub royalty_percentage: u8,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_reference: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Listing {
    pub fn new(
        title: impl Into<String>,
        content_reference: impl Into<String>,
        price: Amount,
        royalty_percentage: u8,
    ) -> Self {
        Self {
            title: title.into(),
            content_reference: content_reference.into(),
            price,
            royalty_percentage,
            description: None,
            cover_reference: None,
            categories: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cover(mut self, cover_reference: impl Into<String>) -> Self {
        self.cover_reference = Some(cover_reference.into());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Entitlement of a buyer to a book. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub book_id: BookId,
    pub buyer: Address,
    /// Payment attached to the purchase, before any refund
    #[serde(with = "as_string")]
    pub amount_paid: Amount,
    pub purchased_at: i64,
}
