use super::domain::{User, UserId};

/// Storage abstraction over accounts so the services can be exercised against
/// in-memory fixtures.
///
/// `all` returns accounts in insertion order so admin tables stay stable.
pub trait UserDirectory: Send + Sync {
    fn insert(&self, user: User) -> Result<User, DirectoryError>;
    fn update(&self, user: User) -> Result<(), DirectoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, DirectoryError>;
    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;
    fn all(&self) -> Result<Vec<User>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("account already exists")]
    Conflict,
    #[error("account not found")]
    NotFound,
    #[error("account directory unavailable: {0}")]
    Unavailable(String),
}
