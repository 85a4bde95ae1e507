//! The listing query engine: pure, total filter and sort transforms applied on
//! every feed render. No I/O, no shared state; callers own the inputs and get
//! back a fresh sequence.

use serde::{Deserialize, Serialize};

use super::domain::Listing;

/// Optional constraints used to narrow a listing collection. An absent field
/// means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Free-text query matched against title or description.
    pub query: Option<String>,
    /// Substring matched against the listing location.
    pub location: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

impl FilterSpec {
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a spec from raw request strings.
    ///
    /// Blank text fields and malformed numeric bounds normalize to "no
    /// constraint" rather than being rejected; the filter bar is forgiving by
    /// policy.
    pub fn from_params(
        query: Option<&str>,
        location: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
    ) -> Self {
        Self {
            query: query.and_then(non_blank),
            location: location.and_then(non_blank),
            min_price: min_price.and_then(parse_price_bound),
            max_price: max_price.and_then(parse_price_bound),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.query.is_none()
            && self.location.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Whether every supplied constraint holds for the listing. Text matching
    /// is case-insensitive substring containment.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let in_title = listing.title.to_lowercase().contains(&needle);
            let in_description = listing.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }

        if let Some(location) = &self.location {
            let needle = location.to_lowercase();
            if !listing.location.to_lowercase().contains(&needle) {
                return false;
            }
        }

        if let Some(min) = self.min_price {
            if listing.price < min {
                return false;
            }
        }

        if let Some(max) = self.max_price {
            if listing.price > max {
                return false;
            }
        }

        true
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_price_bound(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Presentation order for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    /// Parse a request-supplied key. Unknown keys yield `None`; callers leave
    /// the feed in its original order rather than erroring.
    pub fn from_param(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest first",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
        }
    }
}

/// Keep the listings the spec matches, preserving relative order.
pub fn filter_listings(listings: Vec<Listing>, spec: &FilterSpec) -> Vec<Listing> {
    let mut listings = listings;
    listings.retain(|listing| spec.matches(listing));
    listings
}

/// Order a feed by the given key. Ties keep their original relative order, so
/// applying the same key twice is a no-op.
pub fn sort_listings(mut listings: Vec<Listing>, key: SortKey) -> Vec<Listing> {
    match key {
        SortKey::Newest => listings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::PriceAsc => listings.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => listings.sort_by(|a, b| b.price.cmp(&a.price)),
    }
    listings
}
