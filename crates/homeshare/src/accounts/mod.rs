//! Accounts and sessions: the user directory abstraction, the demo-grade
//! login/logout flow, and the auth extraction helpers used by the routers.

pub mod directory;
pub mod domain;
pub mod router;
pub mod session;

pub use directory::{DirectoryError, UserDirectory};
pub use domain::{User, UserId, UserRole};
pub use router::{account_router, bearer_token, require_session};
pub use session::{SessionError, SessionGrant, SessionService};
