//! End-to-end checks for the billing flow: login, purchase a package through
//! the simulated gateway, and confirm the credits and order history line up.

mod common {
    use std::sync::{Arc, Mutex};

    use homeshare::accounts::{
        DirectoryError, SessionService, User, UserDirectory, UserId, UserRole,
    };
    use homeshare::billing::{
        BillingService, Order, OrderId, OrderStore, OrderStoreError, PackageCatalog,
    };

    #[derive(Default)]
    pub struct MemoryDirectory {
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

    #[derive(Default)]
    pub struct MemoryOrders {
        records: Mutex<Vec<Order>>,
    }

    impl OrderStore for MemoryOrders {
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

    pub fn student() -> User {
        User {
            id: UserId("user-an".to_string()),
            name: "Nguyễn Văn An".to_string(),
            email: "an@student.edu.vn".to_string(),
            role: UserRole::User,
            remaining_credits: 5,
            current_package: None,
        }
    }

    pub fn billing_stack() -> (
        BillingService<MemoryOrders, MemoryDirectory>,
        Arc<SessionService<MemoryDirectory>>,
        Arc<MemoryDirectory>,
    ) {
        let directory = Arc::new(MemoryDirectory::default());
        directory.insert(student()).expect("seed user inserted");

        let billing = BillingService::new(
            Arc::new(MemoryOrders::default()),
            directory.clone(),
            PackageCatalog::standard(),
        );
        let sessions = Arc::new(SessionService::new(directory.clone(), 120));
        (billing, sessions, directory)
    }
}

use common::*;
use homeshare::accounts::{SessionError, UserDirectory, UserRole};
use homeshare::billing::{BillingError, OrderStatus, PackageId, PaymentMethod};

#[test]
fn login_then_purchase_adds_credits_and_completes_the_order() {
    let (billing, sessions, directory) = billing_stack();

    let grant = sessions
        .login("an@student.edu.vn", "password")
        .expect("student logs in");
    assert_eq!(grant.user.remaining_credits, 5);

    let order = billing
        .purchase(
            &grant.user.id,
            &PackageId("user_weekly".to_string()),
            PaymentMethod::Momo,
        )
        .expect("purchase settles");

    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.completed_at.is_some());

    let refreshed = directory
        .fetch(&grant.user.id)
        .expect("directory reachable")
        .expect("student present");
    assert_eq!(refreshed.remaining_credits, 12);
    assert_eq!(
        refreshed.current_package,
        Some(PackageId("user_weekly".to_string()))
    );
}

#[test]
fn history_lists_orders_newest_first() {
    let (billing, sessions, _) = billing_stack();
    let grant = sessions
        .login("an@student.edu.vn", "password")
        .expect("student logs in");

    billing
        .purchase(
            &grant.user.id,
            &PackageId("user_daily".to_string()),
            PaymentMethod::ZaloPay,
        )
        .expect("first purchase settles");
    let second = billing
        .purchase(
            &grant.user.id,
            &PackageId("user_monthly".to_string()),
            PaymentMethod::BankTransfer,
        )
        .expect("second purchase settles");

    let history = billing.history(&grant.user.id).expect("history loads");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
}

#[test]
fn the_catalog_is_gated_by_role() {
    let (billing, sessions, _) = billing_stack();
    let grant = sessions
        .login("an@student.edu.vn", "password")
        .expect("student logs in");

    let visible = billing.packages_for(grant.user.role);
    assert_eq!(visible.len(), 3);
    assert!(visible.iter().all(|package| package.id.0.starts_with("user_")));
    assert!(billing.packages_for(UserRole::Guest).is_empty());

    assert!(matches!(
        billing.purchase(
            &grant.user.id,
            &PackageId("sale_premium".to_string()),
            PaymentMethod::Card,
        ),
        Err(BillingError::NotAvailableForRole { .. })
    ));
}

#[test]
fn sessions_expire_and_logins_can_fail() {
    let (_, sessions, _) = billing_stack();

    assert!(matches!(
        sessions.login("unknown@example.com", "pw"),
        Err(SessionError::InvalidCredentials)
    ));

    let short_lived = sessions.login("an@student.edu.vn", "pw").expect("logs in");
    sessions.logout(&short_lived.token);
    assert!(matches!(
        sessions.current_user(&short_lived.token),
        Err(SessionError::UnknownToken)
    ));
}
