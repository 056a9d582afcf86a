//! Session store: who is logged in, and with which roles.
//!
//! The session is rehydrated synchronously from durable client storage when
//! the store is opened, so restarting the client does not log the user out.
//! State changes are broadcast over a watch channel; views that hold a
//! receiver see a logout immediately.

pub mod storage;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::LoginResponse;
pub use storage::{ClientStorage, FileStorage, MemoryStorage, StorageError, TOKEN_KEY, USER_KEY};

/// Prefix the backend puts in front of every role name on the wire.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Authorization tag gating a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    User,
    Admin,
    Staff,
    LibStaff,
}

impl Role {
    /// Roles an account may pick for itself at signup
    pub const SIGNUP: [Role; 2] = [Role::User, Role::Staff];

    /// Bare role name, as sent on registration
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::LibStaff => "LIB_STAFF",
        }
    }

    /// Role as it appears in a login response (`ROLE_ADMIN`)
    pub fn authority(&self) -> String {
        format!("{}{}", ROLE_PREFIX, self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let bare = upper.strip_prefix(ROLE_PREFIX).unwrap_or(&upper);
        match bare {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            "STAFF" => Ok(Role::Staff),
            "LIB_STAFF" | "LIB-STAFF" | "LIBSTAFF" => Ok(Role::LibStaff),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// The authenticated identity. Roles are kept as the literal wire strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Session {
    pub fn new<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Literal membership check against `ROLE_<NAME>`.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role.authority())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Single source of truth for the current session.
///
/// Created once at startup and handed to everything that needs it.
pub struct SessionStore {
    storage: Box<dyn ClientStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Open the store and rehydrate from storage. A missing or malformed
    /// record means "no session".
    pub fn open(storage: impl ClientStorage + 'static) -> Self {
        let initial = Self::rehydrate(&storage);
        let (state, _) = watch::channel(initial);
        Self {
            storage: Box::new(storage),
            state,
        }
    }

    fn rehydrate(storage: &dyn ClientStorage) -> SessionState {
        let Some(raw) = storage.get(USER_KEY) else {
            debug!("No persisted session");
            return SessionState::Unauthenticated;
        };

        match serde_json::from_str::<Option<Session>>(&raw) {
            Ok(Some(session)) if !session.username.is_empty() => {
                debug!(username = %session.username, "Rehydrated session from storage");
                SessionState::Authenticated(session)
            }
            Ok(_) => SessionState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "Persisted session record is malformed, ignoring it");
                SessionState::Unauthenticated
            }
        }
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Bearer token stored by the last successful login.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Record a successful login. Storage failures are logged and the
    /// in-memory session is still established.
    pub fn login(&self, response: &LoginResponse) {
        let session = Session::new(response.username.clone(), response.roles.iter().cloned());

        if let Err(e) = self.persist(&response.token, &session) {
            warn!(error = %e, "Failed to persist session; it will not survive a restart");
        }

        info!(username = %session.username, roles = ?session.roles, "Logged in");
        self.state.send_replace(SessionState::Authenticated(session));
    }

    fn persist(&self, token: &str, session: &Session) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, token)?;
        self.storage.set(USER_KEY, &serde_json::to_string(session)?)?;
        Ok(())
    }

    /// Clear every stored key and drop the in-memory session.
    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear client storage");
            // Best effort on the individual keys so a reload stays logged out
            let _ = self.storage.remove(TOKEN_KEY);
            let _ = self.storage.remove(USER_KEY);
        }

        let previous = self.state.send_replace(SessionState::Unauthenticated);
        if let SessionState::Authenticated(session) = previous {
            info!(username = %session.username, "Logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_response(roles: &[&str]) -> LoginResponse {
        LoginResponse {
            token: "jwt-token".to_string(),
            username: "mira".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("lib_staff".parse::<Role>().unwrap(), Role::LibStaff);
        assert!("ROLE_JANITOR".parse::<Role>().is_err());
        assert_eq!(Role::LibStaff.authority(), "ROLE_LIB_STAFF");
    }

    #[test]
    fn test_has_role_matches_prefixed_value_literally() {
        let session = Session::new("mira", ["ROLE_ADMIN"]);
        assert!(session.has_role(Role::Admin));
        assert!(!session.has_role(Role::User));

        // A bare role name on the wire does not count
        let bare = Session::new("mira", ["ADMIN"]);
        assert!(!bare.has_role(Role::Admin));
    }

    #[test]
    fn test_starts_unauthenticated_without_record() {
        let store = SessionStore::open(MemoryStorage::new());
        assert_eq!(store.current(), SessionState::Unauthenticated);
        assert!(store.token().is_none());
    }

    #[test]
    fn test_login_persists_token_and_user() {
        let store = SessionStore::open(MemoryStorage::new());
        store.login(&login_response(&["ROLE_USER"]));

        assert_eq!(store.token().as_deref(), Some("jwt-token"));
        let session = store.current();
        let session = session.session().unwrap();
        assert_eq!(session.username, "mira");
        assert!(session.has_role(Role::User));
    }

    #[test]
    fn test_rehydrates_persisted_session() {
        let storage = MemoryStorage::with_entries([
            (TOKEN_KEY, "jwt-token"),
            (USER_KEY, r#"{"username":"mira","roles":["ROLE_LIB_STAFF"]}"#),
        ]);
        let store = SessionStore::open(storage);

        let state = store.current();
        assert!(state.is_authenticated());
        assert!(state.session().unwrap().has_role(Role::LibStaff));
    }

    #[test]
    fn test_malformed_record_is_no_session() {
        for raw in ["{not json", "null", r#"{"roles":["ROLE_USER"]}"#, r#"{"username":""}"#] {
            let store = SessionStore::open(MemoryStorage::with_entries([(USER_KEY, raw)]));
            assert_eq!(store.current(), SessionState::Unauthenticated, "record: {}", raw);
        }
    }

    #[test]
    fn test_logout_clears_storage_and_notifies() {
        let store = SessionStore::open(MemoryStorage::new());
        store.login(&login_response(&["ROLE_ADMIN"]));

        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_authenticated());

        store.logout();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Unauthenticated);
        assert!(store.token().is_none());
        assert_eq!(store.current(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_login_survives_reopen_over_file_storage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("storage.json");

        let store = SessionStore::open(FileStorage::new(&path));
        store.login(&login_response(&["ROLE_STAFF"]));
        drop(store);

        let reopened = SessionStore::open(FileStorage::new(&path));
        let state = reopened.current();
        assert_eq!(state.session().unwrap().username, "mira");
        assert!(state.session().unwrap().has_role(Role::Staff));
        assert_eq!(reopened.token().as_deref(), Some("jwt-token"));
    }

    #[test]
    fn test_logout_survives_reopen_over_file_storage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("storage.json");

        let store = SessionStore::open(FileStorage::new(&path));
        store.login(&login_response(&["ROLE_USER"]));
        store.logout();

        let reopened = SessionStore::open(FileStorage::new(&path));
        assert_eq!(reopened.current(), SessionState::Unauthenticated);
        assert!(reopened.token().is_none());
    }

    #[test]
    fn test_roles_are_not_reinterpreted_after_login() {
        let store = SessionStore::open(MemoryStorage::new());
        store.login(&login_response(&["ROLE_USER", "ROLE_CUSTOM"]));
        let state = store.current();
        let roles = &state.session().unwrap().roles;
        assert!(roles.contains("ROLE_CUSTOM"));
        assert_eq!(roles.len(), 2);
    }
}
