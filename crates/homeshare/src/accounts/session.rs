use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::directory::{DirectoryError, UserDirectory};
use super::domain::User;

/// Session provider backed by the user directory.
///
/// Credentials are demo-grade: a login succeeds for any known email with a
/// non-empty password, mirroring the mock gateway this service fronts. Tokens
/// are opaque and unsigned.
pub struct SessionService<D> {
    users: Arc<D>,
    sessions: Mutex<HashMap<String, SessionRecord>>,
    ttl: Duration,
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: super::domain::UserId,
    expires_at: DateTime<Utc>,
}

/// Token and account snapshot returned from a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct SessionGrant {
    pub token: String,
    pub user: User,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_token(issued_at: DateTime<Utc>) -> String {
    let sequence = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "hs-{sequence:06}-{:x}",
        issued_at.timestamp_nanos_opt().unwrap_or_default()
    )
}

impl<D> SessionService<D>
where
    D: UserDirectory + 'static,
{
    pub fn new(users: Arc<D>, ttl_minutes: i64) -> Self {
        Self {
            users,
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Authenticate an email/password pair and issue a fresh session token.
    pub fn login(&self, email: &str, password: &str) -> Result<SessionGrant, SessionError> {
        if password.trim().is_empty() {
            return Err(SessionError::InvalidCredentials);
        }

        let user = self
            .users
            .fetch_by_email(email.trim())?
            .ok_or(SessionError::InvalidCredentials)?;

        let now = Utc::now();
        let token = next_session_token(now);
        let record = SessionRecord {
            user_id: user.id.clone(),
            expires_at: now + self.ttl,
        };

        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.insert(token.clone(), record);

        Ok(SessionGrant { token, user })
    }

    /// Resolve a token to the current account snapshot.
    ///
    /// Expired tokens are evicted on first sight so the session table does not
    /// accumulate stale entries.
    pub fn current_user(&self, token: &str) -> Result<User, SessionError> {
        let record = {
            let mut guard = self.sessions.lock().expect("session mutex poisoned");
            match guard.get(token).cloned() {
                Some(record) if record.expires_at <= Utc::now() => {
                    guard.remove(token);
                    return Err(SessionError::Expired);
                }
                Some(record) => record,
                None => return Err(SessionError::UnknownToken),
            }
        };

        match self.users.fetch(&record.user_id)? {
            Some(user) => Ok(user),
            None => {
                let mut guard = self.sessions.lock().expect("session mutex poisoned");
                guard.remove(token);
                Err(SessionError::UnknownToken)
            }
        }
    }

    /// Drop a session. Unknown tokens are ignored so logout stays idempotent.
    pub fn logout(&self, token: &str) {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.remove(token);
    }

    pub fn active_sessions(&self) -> usize {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        guard.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("email or password is incorrect")]
    InvalidCredentials,
    #[error("session token is not recognized")]
    UnknownToken,
    #[error("session has expired, log in again")]
    Expired,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::domain::{UserId, UserRole};
    use std::collections::HashMap as StdHashMap;

    #[derive(Default)]
    struct MemoryDirectory {
        records: Mutex<StdHashMap<String, User>>,
    }

    impl MemoryDirectory {
        fn with_user(user: User) -> Arc<Self> {
            let directory = Self::default();
            directory
                .records
                .lock()
                .expect("directory mutex poisoned")
                .insert(user.id.0.clone(), user);
            Arc::new(directory)
        }
    }

    impl UserDirectory for MemoryDirectory {
        fn insert(&self, user: User) -> Result<User, DirectoryError> {
            let mut guard = self.records.lock().expect("directory mutex poisoned");
            if guard.contains_key(&user.id.0) {
                return Err(DirectoryError::Conflict);
            }
            guard.insert(user.id.0.clone(), user.clone());
            Ok(user)
        }

        fn update(&self, user: User) -> Result<(), DirectoryError> {
            let mut guard = self.records.lock().expect("directory mutex poisoned");
            if guard.contains_key(&user.id.0) {
                guard.insert(user.id.0.clone(), user);
                Ok(())
            } else {
                Err(DirectoryError::NotFound)
            }
        }

        fn fetch(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
            let guard = self.records.lock().expect("directory mutex poisoned");
            Ok(guard.get(&id.0).cloned())
        }

        fn fetch_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
            let guard = self.records.lock().expect("directory mutex poisoned");
            Ok(guard
                .values()
                .find(|user| user.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        fn all(&self) -> Result<Vec<User>, DirectoryError> {
            let guard = self.records.lock().expect("directory mutex poisoned");
            Ok(guard.values().cloned().collect())
        }
    }

    fn member() -> User {
        User {
            id: UserId("user-000001".to_string()),
            name: "Nguyễn Văn An".to_string(),
            email: "an@student.edu.vn".to_string(),
            role: UserRole::User,
            remaining_credits: 5,
            current_package: None,
        }
    }

    #[test]
    fn login_issues_token_for_known_email() {
        let sessions = SessionService::new(MemoryDirectory::with_user(member()), 120);

        let grant = sessions
            .login("an@student.edu.vn", "any-password")
            .expect("known email logs in");

        assert_eq!(grant.user.email, "an@student.edu.vn");
        let resolved = sessions
            .current_user(&grant.token)
            .expect("token resolves while fresh");
        assert_eq!(resolved.id, grant.user.id);
    }

    #[test]
    fn login_rejects_unknown_email_and_blank_password() {
        let sessions = SessionService::new(MemoryDirectory::with_user(member()), 120);

        assert!(matches!(
            sessions.login("nobody@example.com", "secret"),
            Err(SessionError::InvalidCredentials)
        ));
        assert!(matches!(
            sessions.login("an@student.edu.vn", "   "),
            Err(SessionError::InvalidCredentials)
        ));
    }

    #[test]
    fn expired_sessions_are_evicted() {
        let sessions = SessionService::new(MemoryDirectory::with_user(member()), 0);

        let grant = sessions.login("an@student.edu.vn", "pw").expect("logs in");
        assert!(matches!(
            sessions.current_user(&grant.token),
            Err(SessionError::Expired)
        ));
        // second lookup sees the token already gone
        assert!(matches!(
            sessions.current_user(&grant.token),
            Err(SessionError::UnknownToken)
        ));
    }

    #[test]
    fn logout_is_idempotent() {
        let sessions = SessionService::new(MemoryDirectory::with_user(member()), 120);

        let grant = sessions.login("an@student.edu.vn", "pw").expect("logs in");
        sessions.logout(&grant.token);
        sessions.logout(&grant.token);

        assert!(matches!(
            sessions.current_user(&grant.token),
            Err(SessionError::UnknownToken)
        ));
        assert_eq!(sessions.active_sessions(), 0);
    }
}
