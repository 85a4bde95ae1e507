use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::domain::{UserId, UserRole};

/// Identifier wrapper for purchasable packages, e.g. `user_weekly`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId(pub String);

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which audience a package is sold to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageTier {
    User,
    Sale,
}

impl PackageTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "Member",
            Self::Sale => "Sales Agent",
        }
    }

    /// Managers can buy from either tier; guests from none.
    pub const fn available_to(self, role: UserRole) -> bool {
        match (self, role) {
            (_, UserRole::Manager) => true,
            (Self::User, UserRole::User) => true,
            (Self::Sale, UserRole::Sale) => true,
            _ => false,
        }
    }
}

/// A purchasable bundle granting post credits over a duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    pub tier: PackageTier,
    /// Price in VND.
    pub price: u64,
    /// Post credits granted on settlement.
    pub credits: u32,
    pub duration_days: u32,
}

/// The fixed package lineup sold by the marketplace.
#[derive(Debug, Clone)]
pub struct PackageCatalog {
    packages: Vec<Package>,
}

impl PackageCatalog {
    pub fn standard() -> Self {
        let entry = |id: &str, name: &str, tier, price, credits, duration_days| Package {
            id: PackageId(id.to_string()),
            name: name.to_string(),
            tier,
            price,
            credits,
            duration_days,
        };

        Self {
            packages: vec![
                entry("user_daily", "Daily package", PackageTier::User, 7_000, 1, 1),
                entry("user_weekly", "Weekly package", PackageTier::User, 100_000, 7, 7),
                entry("user_monthly", "Monthly package", PackageTier::User, 400_000, 30, 30),
                entry("sale_basic", "Basic package", PackageTier::Sale, 149_000, 10, 30),
                entry("sale_standard", "Standard package", PackageTier::Sale, 299_000, 20, 30),
                entry("sale_premium", "Premium package", PackageTier::Sale, 499_000, 60, 30),
            ],
        }
    }

    pub fn all(&self) -> &[Package] {
        &self.packages
    }

    pub fn find(&self, id: &PackageId) -> Option<&Package> {
        self.packages.iter().find(|package| &package.id == id)
    }

    /// Packages visible to a role, in catalog order.
    pub fn for_role(&self, role: UserRole) -> Vec<Package> {
        self.packages
            .iter()
            .filter(|package| package.tier.available_to(role))
            .cloned()
            .collect()
    }
}

/// Payment channel chosen at checkout. The gateway behind it is simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Momo,
    #[serde(rename = "zalopay")]
    ZaloPay,
    BankTransfer,
    Card,
}

impl PaymentMethod {
    pub fn from_param(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "momo" => Some(Self::Momo),
            "zalopay" => Some(Self::ZaloPay),
            "bank_transfer" | "banking" => Some(Self::BankTransfer),
            "card" => Some(Self::Card),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Momo => "MoMo wallet",
            Self::ZaloPay => "ZaloPay wallet",
            Self::BankTransfer => "Bank transfer",
            Self::Card => "Credit/debit card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

/// Identifier wrapper for purchase orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One purchase attempt. The package is snapshotted at checkout so later
/// catalog edits never rewrite past orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub package: Package,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
