use serde::Serialize;

use super::domain::{Listing, ListingId};

/// Storage abstraction over published listings.
///
/// `all` returns listings in insertion order; the query engine depends on a
/// stable input order for its tie-breaking guarantees.
pub trait ListingRepository: Send + Sync {
    fn insert(&self, listing: Listing) -> Result<Listing, RepositoryError>;
    fn update(&self, listing: Listing) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError>;
    fn remove(&self, id: &ListingId) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<Listing>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("listing already exists")]
    Conflict,
    #[error("listing not found")]
    NotFound,
    #[error("listing store unavailable: {0}")]
    Unavailable(String),
}

/// Feed response view pairing the surviving listings with their count.
#[derive(Debug, Clone, Serialize)]
pub struct FeedView {
    pub total: usize,
    pub listings: Vec<Listing>,
}

impl FeedView {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            total: listings.len(),
            listings,
        }
    }
}
