use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use homeshare::accounts::{DirectoryError, User, UserDirectory, UserId, UserRole};
use homeshare::billing::{
    Order, OrderId, OrderStatus, OrderStore, OrderStoreError, PackageCatalog, PackageId,
    PaymentMethod,
};
use homeshare::listings::{
    ContactChannels, Listing, ListingCategory, ListingId, ListingRepository, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryListingRepository {
    records: Arc<Mutex<Vec<Listing>>>,
}

impl InMemoryListingRepository {
    /// Load fixtures straight into the store, bypassing credit accounting.
    pub(crate) fn preload(&self, listings: Vec<Listing>) {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        guard.extend(listings);
    }
}

impl ListingRepository for InMemoryListingRepository {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserDirectory {
    records: Arc<Mutex<Vec<User>>>,
}

impl InMemoryUserDirectory {
    pub(crate) fn preload(&self, users: Vec<User>) {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        guard.extend(users);
    }
}

impl UserDirectory for InMemoryUserDirectory {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryOrderStore {
    records: Arc<Mutex<Vec<Order>>>,
}

impl InMemoryOrderStore {
    pub(crate) fn preload(&self, orders: Vec<Order>) {
        let mut guard = self.records.lock().expect("order mutex poisoned");
        guard.extend(orders);
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: Order) -> Result<Order, OrderStoreError> {
        let mut guard = self.records.lock().expect("order mutex poisoned");
        if guard.iter().any(|existing| existing.id == order.id) {
            return Err(OrderStoreError::Conflict);
        }
        guard.push(order.clone());
        Ok(order)
    }

    fn update(&self, order: Order) -> Result<(), OrderStoreError> {
        let mut guard = self.records.lock().expect("order mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == order.id) {
            Some(slot) => {
                *slot = order;
                Ok(())
            }
            None => Err(OrderStoreError::NotFound),
        }
    }

    fn fetch(&self, id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let guard = self.records.lock().expect("order mutex poisoned");
        Ok(guard.iter().find(|order| &order.id == id).cloned())
    }

    fn for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderStoreError> {
        let guard = self.records.lock().expect("order mutex poisoned");
        Ok(guard
            .iter()
            .filter(|order| &order.user_id == user_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Order>, OrderStoreError> {
        let guard = self.records.lock().expect("order mutex poisoned");
        Ok(guard.clone())
    }
}

pub(crate) fn demo_users() -> Vec<User> {
    vec![
        User {
            id: UserId("user-an".to_string()),
            name: "Nguyễn Văn An".to_string(),
            email: "an@student.edu.vn".to_string(),
            role: UserRole::User,
            remaining_credits: 5,
            current_package: None,
        },
        User {
            id: UserId("user-binh".to_string()),
            name: "Trần Thị Bình".to_string(),
            email: "binh@realestate.com".to_string(),
            role: UserRole::Sale,
            remaining_credits: 15,
            current_package: Some(PackageId("sale_standard".to_string())),
        },
        User {
            id: UserId("user-admin".to_string()),
            name: "Admin".to_string(),
            email: "admin@homeshare.com".to_string(),
            role: UserRole::Manager,
            remaining_credits: 0,
            current_package: None,
        },
    ]
}

pub(crate) fn demo_listings() -> Vec<Listing> {
    let posted = |y, m, d| {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0)
            .single()
            .expect("valid seed timestamp")
    };

    vec![
        Listing {
            id: ListingId("post-roommate-0001".to_string()),
            category: ListingCategory::Roommate,
            title: "Tìm bạn nữ ở ghép gần ĐH Bách Khoa".to_string(),
            description: "Mình là sinh viên năm 2, tìm bạn nữ ở ghép. Phòng sạch sẽ, an ninh tốt."
                .to_string(),
            price: 2_500_000,
            location: "Quận 1, TP.HCM".to_string(),
            images: vec!["/img/placeholder.svg".to_string()],
            amenities: vec![
                "WiFi".to_string(),
                "Máy lạnh".to_string(),
                "Tủ lạnh".to_string(),
            ],
            author_id: UserId("user-an".to_string()),
            created_at: posted(2024, 1, 20),
            active: true,
            contact: ContactChannels {
                phone: Some("0901234567".to_string()),
                zalo: Some("0901234567".to_string()),
                email: None,
            },
        },
        Listing {
            id: ListingId("post-apartment-0001".to_string()),
            category: ListingCategory::Apartment,
            title: "Cho thuê căn hộ dịch vụ cao cấp".to_string(),
            description: "Căn hộ 1PN đầy đủ nội thất, view đẹp, gần trung tâm.".to_string(),
            price: 8_000_000,
            location: "Quận 3, TP.HCM".to_string(),
            images: vec![
                "/img/placeholder.svg".to_string(),
                "/img/placeholder-2.svg".to_string(),
            ],
            amenities: vec![
                "WiFi".to_string(),
                "Gym".to_string(),
                "Hồ bơi".to_string(),
                "Bảo vệ 24/7".to_string(),
            ],
            author_id: UserId("user-binh".to_string()),
            created_at: posted(2024, 1, 18),
            active: true,
            contact: ContactChannels {
                phone: Some("0907654321".to_string()),
                zalo: None,
                email: Some("contact@realestate.com".to_string()),
            },
        },
    ]
}

pub(crate) fn demo_orders() -> Vec<Order> {
    let catalog = PackageCatalog::standard();
    let weekly = catalog
        .find(&PackageId("user_weekly".to_string()))
        .expect("catalog carries the weekly package")
        .clone();
    let settled = Utc
        .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
        .single()
        .expect("valid seed timestamp");

    vec![Order {
        id: OrderId("order-seed-0001".to_string()),
        user_id: UserId("user-an".to_string()),
        package: weekly,
        status: OrderStatus::Completed,
        payment_method: PaymentMethod::Momo,
        created_at: settled,
        completed_at: Some(settled),
    }]
}

pub(crate) fn seed_demo_data(
    directory: &InMemoryUserDirectory,
    listings: &InMemoryListingRepository,
    orders: &InMemoryOrderStore,
) {
    directory.preload(demo_users());
    listings.preload(demo_listings());
    orders.preload(demo_orders());
}
