use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::domain::UserId;

/// Identifier wrapper for published listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which feed a listing belongs to. Fixed at creation: the update patch type
/// carries no category field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    Roommate,
    Apartment,
}

impl ListingCategory {
    pub const fn ordered() -> [Self; 2] {
        [Self::Roommate, Self::Apartment]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Roommate => "Roommate",
            Self::Apartment => "Serviced apartment",
        }
    }

    pub fn from_param(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "roommate" => Some(Self::Roommate),
            "apartment" => Some(Self::Apartment),
            _ => None,
        }
    }
}

/// Direct-contact channels shown on a listing card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactChannels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zalo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ContactChannels {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.zalo.is_none() && self.email.is_none()
    }
}

/// A published room or apartment post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub category: ListingCategory,
    pub title: String,
    pub description: String,
    /// Asking price in VND.
    pub price: u64,
    pub location: String,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "ContactChannels::is_empty")]
    pub contact: ContactChannels,
}

/// Author-supplied payload for a new listing. Identity, timestamp, and the
/// active flag are stamped by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    pub category: ListingCategory,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub contact: ContactChannels,
}

/// Owner-editable fields. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub contact: Option<ContactChannels>,
    pub active: Option<bool>,
}

impl ListingPatch {
    pub fn apply(self, listing: &mut Listing) {
        let ListingPatch {
            title,
            description,
            price,
            location,
            images,
            amenities,
            contact,
            active,
        } = self;

        if let Some(title) = title {
            listing.title = title;
        }
        if let Some(description) = description {
            listing.description = description;
        }
        if let Some(price) = price {
            listing.price = price;
        }
        if let Some(location) = location {
            listing.location = location;
        }
        if let Some(images) = images {
            listing.images = images;
        }
        if let Some(amenities) = amenities {
            listing.amenities = amenities;
        }
        if let Some(contact) = contact {
            listing.contact = contact;
        }
        if let Some(active) = active {
            listing.active = active;
        }
    }
}
