//! The listing catalog: domain types, the pure filter/sort query engine,
//! publication rules (post credits, ownership), CSV import, and HTTP routes.

pub mod domain;
pub mod import;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ContactChannels, Listing, ListingCategory, ListingDraft, ListingId, ListingPatch};
pub use import::{ListingCsvImporter, ListingImportError};
pub use query::{filter_listings, sort_listings, FilterSpec, SortKey};
pub use repository::{FeedView, ListingRepository, RepositoryError};
pub use router::listing_router;
pub use service::{DraftValidationError, ListingService, ListingServiceError};
