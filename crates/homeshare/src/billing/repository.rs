use crate::accounts::domain::UserId;

use super::domain::{Order, OrderId};

/// Storage abstraction for purchase orders.
///
/// `for_user` and `all` return orders in insertion order; callers apply their
/// own presentation ordering.
pub trait OrderStore: Send + Sync {
    fn insert(&self, order: Order) -> Result<Order, OrderStoreError>;
    fn update(&self, order: Order) -> Result<(), OrderStoreError>;
    fn fetch(&self, id: &OrderId) -> Result<Option<Order>, OrderStoreError>;
    fn for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderStoreError>;
    fn all(&self) -> Result<Vec<Order>, OrderStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OrderStoreError {
    #[error("order already exists")]
    Conflict,
    #[error("order not found")]
    NotFound,
    #[error("order store unavailable: {0}")]
    Unavailable(String),
}
