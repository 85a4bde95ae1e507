use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::accounts::directory::{DirectoryError, UserDirectory};
use crate::accounts::domain::{User, UserId, UserRole};

use super::domain::{Listing, ListingCategory, ListingDraft, ListingId, ListingPatch};
use super::query::{self, FilterSpec, SortKey};
use super::repository::{ListingRepository, RepositoryError};

/// Service composing the listing store, the user directory, and the query
/// engine. Publication consumes one post credit; a credit balance never goes
/// below zero.
pub struct ListingService<R, D> {
    listings: Arc<R>,
    users: Arc<D>,
}

static LISTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_listing_id() -> ListingId {
    let id = LISTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ListingId(format!("post-{id:06}"))
}

impl<R, D> ListingService<R, D>
where
    R: ListingRepository + 'static,
    D: UserDirectory + 'static,
{
    pub fn new(listings: Arc<R>, users: Arc<D>) -> Self {
        Self { listings, users }
    }

    /// Active listings for a feed, run through the query engine.
    ///
    /// `sort: None` leaves the feed in store order, which is the documented
    /// fallback for unrecognized sort keys.
    pub fn feed(
        &self,
        category: Option<ListingCategory>,
        spec: &FilterSpec,
        sort: Option<SortKey>,
    ) -> Result<Vec<Listing>, ListingServiceError> {
        let mut listings = self.listings.all()?;
        listings.retain(|listing| listing.active);
        if let Some(category) = category {
            listings.retain(|listing| listing.category == category);
        }

        let filtered = query::filter_listings(listings, spec);
        Ok(match sort {
            Some(key) => query::sort_listings(filtered, key),
            None => filtered,
        })
    }

    pub fn get(&self, id: &ListingId) -> Result<Listing, ListingServiceError> {
        let listing = self.listings.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(listing)
    }

    /// Listings an account has published, including withdrawn ones.
    pub fn by_author(&self, author_id: &UserId) -> Result<Vec<Listing>, ListingServiceError> {
        let mut listings = self.listings.all()?;
        listings.retain(|listing| &listing.author_id == author_id);
        Ok(listings)
    }

    /// Publish a new listing, consuming one of the author's post credits.
    pub fn submit(
        &self,
        author_id: &UserId,
        draft: ListingDraft,
    ) -> Result<Listing, ListingServiceError> {
        validate_draft(&draft)?;

        let mut author = self
            .users
            .fetch(author_id)?
            .ok_or(ListingServiceError::UnknownAuthor)?;
        if author.remaining_credits == 0 {
            return Err(ListingServiceError::CreditsExhausted);
        }

        let ListingDraft {
            category,
            title,
            description,
            price,
            location,
            images,
            amenities,
            contact,
        } = draft;

        let listing = Listing {
            id: next_listing_id(),
            category,
            title,
            description,
            price,
            location,
            images,
            amenities,
            author_id: author.id.clone(),
            created_at: Utc::now(),
            active: true,
            contact,
        };

        let stored = self.listings.insert(listing)?;

        author.remaining_credits -= 1;
        self.users.update(author)?;

        info!(
            listing = %stored.id,
            author = %stored.author_id,
            category = stored.category.label(),
            "listing published"
        );

        Ok(stored)
    }

    /// Apply owner edits. Managers may edit any listing; everyone else only
    /// their own. The category stays fixed.
    pub fn amend(
        &self,
        caller: &User,
        id: &ListingId,
        patch: ListingPatch,
    ) -> Result<Listing, ListingServiceError> {
        let mut listing = self.listings.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        ensure_owner_or_manager(caller, &listing)?;

        patch.apply(&mut listing);
        validate_listing(&listing)?;

        self.listings.update(listing.clone())?;
        Ok(listing)
    }

    /// Take a listing off the feeds without deleting it.
    pub fn withdraw(&self, caller: &User, id: &ListingId) -> Result<Listing, ListingServiceError> {
        let mut listing = self.listings.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        ensure_owner_or_manager(caller, &listing)?;

        listing.active = false;
        self.listings.update(listing.clone())?;
        Ok(listing)
    }

    pub fn remove(&self, caller: &User, id: &ListingId) -> Result<(), ListingServiceError> {
        let listing = self.listings.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        ensure_owner_or_manager(caller, &listing)?;

        self.listings.remove(id)?;
        info!(listing = %id, caller = %caller.id, "listing removed");
        Ok(())
    }
}

fn ensure_owner_or_manager(caller: &User, listing: &Listing) -> Result<(), ListingServiceError> {
    if listing.author_id == caller.id || caller.role == UserRole::Manager {
        Ok(())
    } else {
        Err(ListingServiceError::NotOwner)
    }
}

fn validate_draft(draft: &ListingDraft) -> Result<(), DraftValidationError> {
    validate_fields(&draft.title, &draft.description, draft.price)
}

fn validate_listing(listing: &Listing) -> Result<(), DraftValidationError> {
    validate_fields(&listing.title, &listing.description, listing.price)
}

fn validate_fields(title: &str, description: &str, price: u64) -> Result<(), DraftValidationError> {
    if title.trim().is_empty() {
        return Err(DraftValidationError::EmptyTitle);
    }
    if description.trim().is_empty() {
        return Err(DraftValidationError::EmptyDescription);
    }
    if price == 0 {
        return Err(DraftValidationError::ZeroPrice);
    }
    Ok(())
}

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error("author account not found")]
    UnknownAuthor,
    #[error("no remaining post credits")]
    CreditsExhausted,
    #[error("only the listing owner may modify it")]
    NotOwner,
    #[error(transparent)]
    Invalid(#[from] DraftValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Rejections raised before a draft reaches the store.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DraftValidationError {
    #[error("listing title must not be empty")]
    EmptyTitle,
    #[error("listing description must not be empty")]
    EmptyDescription,
    #[error("listing price must be greater than zero")]
    ZeroPrice,
}
