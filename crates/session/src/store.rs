//! Persisted session state

use std::sync::Arc;

use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Storage;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Storage key holding the serialized user profile
pub const USER_KEY: &str = "currentUser";

fn default_provider() -> String {
    "local".to_string()
}

/// Cached profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The user ID
    #[serde(alias = "_id")]
    pub id: String,

    /// Display name
    pub full_name: String,

    /// Email address
    pub email: String,

    /// Identity provider, `local` or `google`
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Avatar image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserProfile {
    /// First word of the full name, for greetings
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }
}

/// A logged-in identity: bearer token plus cached profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The bearer token
    pub token: String,

    /// The user profile
    pub user: UserProfile,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

/// Token + user pair on top of a [`Storage`] backend.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Persist the token and the user together
    pub fn save(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.storage.set_item(TOKEN_KEY, &session.token)?;
        self.storage.set_item(USER_KEY, &user)?;
        Ok(())
    }

    /// The stored bearer token, if any
    pub fn token(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                error!("Failed to read token from storage: {}", e);
                None
            }
        }
    }

    /// The current session, or `None` when logged out.
    ///
    /// A half-written session (only one of the two keys present, or a user
    /// blob that no longer parses) is cleared on the spot and reported as
    /// absent.
    pub fn load(&self) -> Option<Session> {
        let token = self.token();
        let user = match self.storage.get_item(USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                error!("Failed to read user from storage: {}", e);
                None
            }
        };

        match (token, user) {
            (Some(token), Some(raw_user)) => match serde_json::from_str::<UserProfile>(&raw_user) {
                Ok(user) => Some(Session { token, user }),
                Err(e) => {
                    warn!("Stored user profile is unreadable ({}), clearing session", e);
                    self.clear();
                    None
                }
            },
            (None, None) => None,
            (token, _) => {
                warn!(
                    "Inconsistent session in storage (token present: {}), clearing session",
                    token.is_some()
                );
                self.clear();
                None
            }
        }
    }

    /// Whether a complete session is stored
    pub fn is_authenticated(&self) -> bool {
        self.load().is_some()
    }

    /// Remove both entries. Failures are logged; clearing never fails.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                error!("Failed to remove {} from storage: {}", key, e);
            }
        }
    }

    /// Whether either key is present, complete or not
    pub(crate) fn has_any(&self) -> bool {
        let present = |key| matches!(self.storage.get_item(key), Ok(Some(_)));
        present(TOKEN_KEY) || present(USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn user() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            provider: "local".to_string(),
            avatar: None,
        }
    }

    fn store() -> (Arc<MemoryStorage>, TokenStore) {
        let storage = Arc::new(MemoryStorage::new());
        (storage.clone(), TokenStore::new(storage))
    }

    #[test]
    fn test_save_then_load() {
        let (_, store) = store();
        assert!(store.load().is_none());

        let session = Session::new("tok", user());
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));
        assert_eq!(store.token(), Some("tok".to_string()));
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let (storage, store) = store();
        store.save(&Session::new("tok", user())).unwrap();
        store.clear();

        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get_item(USER_KEY).unwrap(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_half_session_is_cleared() {
        let (storage, store) = store();
        storage.set_item(TOKEN_KEY, "tok").unwrap();

        assert!(store.load().is_none());
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);

        storage.set_item(USER_KEY, r#"{"id":"u1","fullName":"A","email":"a@b.co"}"#).unwrap();
        assert!(store.load().is_none());
        assert_eq!(storage.get_item(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_unreadable_user_is_cleared() {
        let (storage, store) = store();
        storage.set_item(TOKEN_KEY, "tok").unwrap();
        storage.set_item(USER_KEY, "{not json").unwrap();

        assert!(store.load().is_none());
        assert!(!store.has_any());
    }

    #[test]
    fn test_user_profile_wire_format() {
        let user: UserProfile = serde_json::from_str(
            r#"{"_id":"42","fullName":"Jane Q Doe","email":"jane@example.com"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.provider, "local");
        assert_eq!(user.first_name(), "Jane");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["fullName"], "Jane Q Doe");
        assert!(json.get("avatar").is_none());
    }
}
