//! Service packages and simulated billing: the package catalog, purchase
//! settlement, and the order history store.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Order, OrderId, OrderStatus, Package, PackageCatalog, PackageId, PackageTier, PaymentMethod,
};
pub use repository::{OrderStore, OrderStoreError};
pub use router::billing_router;
pub use service::{BillingError, BillingService};
