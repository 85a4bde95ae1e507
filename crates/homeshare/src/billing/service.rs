use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::accounts::directory::{DirectoryError, UserDirectory};
use crate::accounts::domain::{UserId, UserRole};

use super::domain::{Order, OrderId, OrderStatus, Package, PackageCatalog, PackageId, PaymentMethod};
use super::repository::{OrderStore, OrderStoreError};

/// Service composing the package catalog, order store, and user directory.
///
/// Settlement is simulated: every purchase records a pending order, flips it to
/// completed, and credits the buyer in one call. No real gateway is contacted.
pub struct BillingService<O, D> {
    orders: Arc<O>,
    users: Arc<D>,
    catalog: PackageCatalog,
}

static ORDER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_order_id() -> OrderId {
    let id = ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OrderId(format!("order-{id:06}"))
}

impl<O, D> BillingService<O, D>
where
    O: OrderStore + 'static,
    D: UserDirectory + 'static,
{
    pub fn new(orders: Arc<O>, users: Arc<D>, catalog: PackageCatalog) -> Self {
        Self {
            orders,
            users,
            catalog,
        }
    }

    pub fn packages_for(&self, role: UserRole) -> Vec<Package> {
        self.catalog.for_role(role)
    }

    /// Run one purchase attempt through the simulated gateway.
    pub fn purchase(
        &self,
        buyer_id: &UserId,
        package_id: &PackageId,
        method: PaymentMethod,
    ) -> Result<Order, BillingError> {
        let mut buyer = self
            .users
            .fetch(buyer_id)?
            .ok_or(BillingError::UnknownBuyer)?;

        let package = self
            .catalog
            .find(package_id)
            .ok_or_else(|| BillingError::UnknownPackage(package_id.clone()))?
            .clone();

        if !package.tier.available_to(buyer.role) {
            return Err(BillingError::NotAvailableForRole {
                package: package.id.clone(),
                role: buyer.role,
            });
        }

        let order = Order {
            id: next_order_id(),
            user_id: buyer.id.clone(),
            package: package.clone(),
            status: OrderStatus::Pending,
            payment_method: method,
            created_at: Utc::now(),
            completed_at: None,
        };
        let mut stored = self.orders.insert(order)?;

        stored.status = OrderStatus::Completed;
        stored.completed_at = Some(Utc::now());
        self.orders.update(stored.clone())?;

        buyer.remaining_credits += package.credits;
        buyer.current_package = Some(package.id.clone());
        self.users.update(buyer)?;

        info!(
            order = %stored.id,
            package = %package.id,
            method = method.label(),
            "package purchase settled"
        );

        Ok(stored)
    }

    /// Purchase history for an account, newest first. Orders settled in the
    /// same instant fall back to latest-created-first.
    pub fn history(&self, user_id: &UserId) -> Result<Vec<Order>, BillingError> {
        let mut orders = self.orders.for_user(user_id)?;
        orders.reverse();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("buyer account not found")]
    UnknownBuyer,
    #[error("unknown package '{0}'")]
    UnknownPackage(PackageId),
    #[error("package '{package}' is not sold to the {} role", .role.label())]
    NotAvailableForRole { package: PackageId, role: UserRole },
    #[error(transparent)]
    Orders(#[from] OrderStoreError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::domain::User;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryOrders {
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

    #[derive(Default)]
    struct MemoryDirectory {
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

    fn service_with_member(role: UserRole) -> (BillingService<MemoryOrders, MemoryDirectory>, UserId) {
        let users = Arc::new(MemoryDirectory::default());
        let buyer = User {
            id: UserId("user-000001".to_string()),
            name: "Trần Thị Bình".to_string(),
            email: "binh@realestate.com".to_string(),
            role,
            remaining_credits: 2,
            current_package: None,
        };
        users.insert(buyer.clone()).expect("buyer inserted");

        let service = BillingService::new(
            Arc::new(MemoryOrders::default()),
            users,
            PackageCatalog::standard(),
        );
        (service, buyer.id)
    }

    #[test]
    fn purchase_settles_and_credits_buyer() {
        let (service, buyer_id) = service_with_member(UserRole::User);

        let order = service
            .purchase(
                &buyer_id,
                &PackageId("user_weekly".to_string()),
                PaymentMethod::Momo,
            )
            .expect("purchase settles");

        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.completed_at.is_some());
        assert_eq!(order.package.credits, 7);

        let history = service.history(&buyer_id).expect("history loads");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, order.id);
    }

    #[test]
    fn purchase_rejects_package_outside_role_tier() {
        let (service, buyer_id) = service_with_member(UserRole::User);

        match service.purchase(
            &buyer_id,
            &PackageId("sale_premium".to_string()),
            PaymentMethod::Card,
        ) {
            Err(BillingError::NotAvailableForRole { package, role }) => {
                assert_eq!(package.0, "sale_premium");
                assert_eq!(role, UserRole::User);
            }
            other => panic!("expected role gate, got {other:?}"),
        }
    }

    #[test]
    fn manager_can_buy_from_both_tiers() {
        let (service, buyer_id) = service_with_member(UserRole::Manager);

        service
            .purchase(
                &buyer_id,
                &PackageId("user_daily".to_string()),
                PaymentMethod::BankTransfer,
            )
            .expect("user tier settles");
        service
            .purchase(
                &buyer_id,
                &PackageId("sale_basic".to_string()),
                PaymentMethod::Card,
            )
            .expect("sale tier settles");

        assert_eq!(service.packages_for(UserRole::Manager).len(), 6);
    }

    #[test]
    fn unknown_package_is_rejected() {
        let (service, buyer_id) = service_with_member(UserRole::User);

        assert!(matches!(
            service.purchase(
                &buyer_id,
                &PackageId("gold_tier".to_string()),
                PaymentMethod::Momo,
            ),
            Err(BillingError::UnknownPackage(_))
        ));
    }
}
