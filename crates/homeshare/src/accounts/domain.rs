use std::fmt;

use serde::{Deserialize, Serialize};

use crate::billing::domain::PackageId;

/// Identifier wrapper for marketplace accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role attached to an account. Roles gate which package tier and which pages
/// are visible; they are a capability gate, not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Guest,
    User,
    Sale,
    Manager,
}

impl UserRole {
    pub const fn ordered() -> [Self; 4] {
        [Self::Guest, Self::User, Self::Sale, Self::Manager]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Guest => "Guest",
            Self::User => "Member",
            Self::Sale => "Sales Agent",
            Self::Manager => "Manager",
        }
    }
}

/// A marketplace account. `remaining_credits` counts how many listings the
/// account may still publish and never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub remaining_credits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_package: Option<PackageId>,
}
