use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::accounts::directory::{DirectoryError, UserDirectory};
use crate::accounts::domain::{User, UserId, UserRole};
use crate::listings::domain::{
    ContactChannels, Listing, ListingCategory, ListingDraft, ListingId,
};
use crate::listings::repository::{ListingRepository, RepositoryError};

#[derive(Default)]
pub(super) struct MemoryListings {
    records: Mutex<Vec<Listing>>,
}

impl ListingRepository for MemoryListings {
    fn insert(&self, listing: Listing) -> Result<Listing, RepositoryError> {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        if guard.iter().any(|existing| existing.id == listing.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(listing.clone());
        Ok(listing)
    }

    fn update(&self, listing: Listing) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == listing.id) {
            Some(slot) => {
                *slot = listing;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        let guard = self.records.lock().expect("listing mutex poisoned");
        Ok(guard.iter().find(|listing| &listing.id == id).cloned())
    }

    fn remove(&self, id: &ListingId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        let before = guard.len();
        guard.retain(|listing| &listing.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<Listing>, RepositoryError> {
        let guard = self.records.lock().expect("listing mutex poisoned");
        Ok(guard.clone())
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    records: Mutex<Vec<User>>,
}

impl UserDirectory for MemoryDirectory {
    fn insert(&self, user: User) -> Result<User, DirectoryError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        if guard.iter().any(|existing| existing.id == user.id) {
            return Err(DirectoryError::Conflict);
        }
        guard.push(user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), DirectoryError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(DirectoryError::NotFound),
        }
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.iter().find(|user| &user.id == id).cloned())
    }

    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn all(&self) -> Result<Vec<User>, DirectoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.clone())
    }
}

pub(super) fn posted_on(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn listing(id: &str, price: u64, location: &str, day: u32) -> Listing {
    Listing {
        id: ListingId(id.to_string()),
        category: ListingCategory::Roommate,
        title: format!("Phòng {id}"),
        description: "Phòng sạch sẽ, an ninh tốt.".to_string(),
        price,
        location: location.to_string(),
        images: vec!["/img/placeholder.svg".to_string()],
        amenities: vec!["WiFi".to_string()],
        author_id: UserId("user-000001".to_string()),
        created_at: posted_on(day),
        active: true,
        contact: ContactChannels::default(),
    }
}

pub(super) fn member(id: &str, credits: u32, role: UserRole) -> User {
    User {
        id: UserId(id.to_string()),
        name: "Nguyễn Văn An".to_string(),
        email: format!("{id}@student.edu.vn"),
        role,
        remaining_credits: credits,
        current_package: None,
    }
}

pub(super) fn roommate_draft(title: &str, price: u64) -> ListingDraft {
    ListingDraft {
        category: ListingCategory::Roommate,
        title: title.to_string(),
        description: "Tìm bạn ở ghép, phòng sạch sẽ.".to_string(),
        price,
        location: "Quận 1, TP.HCM".to_string(),
        images: Vec::new(),
        amenities: vec!["WiFi".to_string(), "Máy lạnh".to_string()],
        contact: ContactChannels {
            phone: Some("0901234567".to_string()),
            zalo: Some("0901234567".to_string()),
            email: None,
        },
    }
}

pub(super) fn directory_with(users: Vec<User>) -> Arc<MemoryDirectory> {
    let directory = MemoryDirectory::default();
    for user in users {
        directory.insert(user).expect("seed user inserted");
    }
    Arc::new(directory)
}
