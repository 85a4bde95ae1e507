//! The closed set of pages a frontend can render, with the capability each one
//! requires. Replaces ad hoc string comparisons with a total table.

use serde::{Deserialize, Serialize};

use crate::accounts::domain::{User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Home,
    RoommateFeed,
    ApartmentFeed,
    ListingDetails,
    CreateListing,
    Profile,
    Packages,
    Payment,
    Orders,
    News,
    Feedback,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Public,
    Authenticated,
    ManagerOnly,
}

impl AccessLevel {
    /// Whether a visitor (none = guest) clears this level.
    pub fn permits(self, visitor: Option<&User>) -> bool {
        match self {
            Self::Public => true,
            Self::Authenticated => visitor.is_some(),
            Self::ManagerOnly => visitor.is_some_and(|user| user.role == UserRole::Manager),
        }
    }
}

impl Page {
    pub const fn ordered() -> [Self; 12] {
        [
            Self::Home,
            Self::RoommateFeed,
            Self::ApartmentFeed,
            Self::ListingDetails,
            Self::CreateListing,
            Self::Profile,
            Self::Packages,
            Self::Payment,
            Self::Orders,
            Self::News,
            Self::Feedback,
            Self::Admin,
        ]
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::RoommateFeed => "roommate-feed",
            Self::ApartmentFeed => "apartment-feed",
            Self::ListingDetails => "listing-details",
            Self::CreateListing => "create-listing",
            Self::Profile => "profile",
            Self::Packages => "packages",
            Self::Payment => "payment",
            Self::Orders => "orders",
            Self::News => "news",
            Self::Feedback => "feedback",
            Self::Admin => "admin",
        }
    }

    pub fn from_tag(raw: &str) -> Option<Self> {
        let tag = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|page| page.tag() == tag)
    }

    /// The capability a visitor needs before this page is rendered.
    pub const fn required_access(self) -> AccessLevel {
        match self {
            Self::Home
            | Self::RoommateFeed
            | Self::ApartmentFeed
            | Self::ListingDetails
            | Self::News
            | Self::Feedback => AccessLevel::Public,
            Self::CreateListing | Self::Profile | Self::Packages | Self::Payment | Self::Orders => {
                AccessLevel::Authenticated
            }
            Self::Admin => AccessLevel::ManagerOnly,
        }
    }

    pub fn visible_to(self, visitor: Option<&User>) -> bool {
        self.required_access().permits(visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::domain::UserId;

    fn visitor(role: UserRole) -> User {
        User {
            id: UserId("user-000009".to_string()),
            name: "Test Visitor".to_string(),
            email: "visitor@example.com".to_string(),
            role,
            remaining_credits: 0,
            current_package: None,
        }
    }

    #[test]
    fn every_tag_round_trips() {
        for page in Page::ordered() {
            assert_eq!(Page::from_tag(page.tag()), Some(page));
        }
        assert_eq!(Page::from_tag("unknown-page"), None);
    }

    #[test]
    fn guests_only_see_public_pages() {
        assert!(Page::Home.visible_to(None));
        assert!(Page::ApartmentFeed.visible_to(None));
        assert!(!Page::CreateListing.visible_to(None));
        assert!(!Page::Orders.visible_to(None));
        assert!(!Page::Payment.visible_to(None));
        assert!(!Page::Admin.visible_to(None));
    }

    #[test]
    fn admin_page_requires_the_manager_role() {
        let member = visitor(UserRole::User);
        let manager = visitor(UserRole::Manager);

        assert!(!Page::Admin.visible_to(Some(&member)));
        assert!(Page::Admin.visible_to(Some(&manager)));
        assert!(Page::Profile.visible_to(Some(&member)));
    }
}
