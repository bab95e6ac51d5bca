//! # Identity Module
//!
//! Login state and the user's editable profile.
//!
//! ## Auth State
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AUTH STATE                                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  @gobia_is_logged_in   "true" / absent                                 │
//! │  @gobia_user_data      { id, email, name?, handle? }                   │
//! │  @gobia_auth_token     opaque string / absent                          │
//! │                                                                         │
//! │  login(user, token?) ──► write user, token (if given), flag            │
//! │  logout()            ──► remove all three                              │
//! │                                                                         │
//! │  The flag is a UI convenience, not a credential: nothing here          │
//! │  verifies the token.                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod profile;

pub use profile::{Profile, ProfileService};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{keys, Document, Storage};

/// Stored value of the logged-in flag
const LOGGED_IN: &str = "true";

/// The logged-in user as the host knows it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Account id
    pub id: String,
    /// Account email
    pub email: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Handle, without the leading `@`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

impl UserData {
    /// A user with only the required fields
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
            handle: None,
        }
    }
}

/// Combined view of the three auth keys
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    /// Whether the logged-in flag is set
    pub is_logged_in: bool,
    /// Stored user, if any
    pub user: Option<UserData>,
    /// Stored token, if any
    pub token: Option<String>,
}

/// Login flag, user identity and token.
#[derive(Debug, Clone)]
pub struct AuthService {
    storage: Storage,
    user: Document,
}

impl AuthService {
    /// Create the service over a storage handle
    pub fn new(storage: Storage) -> Self {
        let user = storage.document(keys::USER_DATA);
        Self { storage, user }
    }

    /// Whether the user is logged in. False on absence or read failure.
    pub async fn is_logged_in(&self) -> bool {
        match self.storage.kv().get(keys::IS_LOGGED_IN).await {
            Ok(flag) => flag.as_deref() == Some(LOGGED_IN),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read login flag");
                false
            }
        }
    }

    /// Mark the user as logged in and remember who they are.
    ///
    /// The token is only written when one is given; an older token is left
    /// in place otherwise.
    pub async fn login(&self, user: &UserData, token: Option<&str>) -> Result<()> {
        let _guard = self.storage.lock(keys::IS_LOGGED_IN).await;

        let result = self.write_login(user, token).await;
        match &result {
            Ok(()) => tracing::info!(user_id = %user.id, "Logged in"),
            Err(e) => tracing::error!(error = %e, "Login failed"),
        }
        result
    }

    /// The flag goes last so it is never set without the user it
    /// belongs to.
    async fn write_login(&self, user: &UserData, token: Option<&str>) -> Result<()> {
        let user_json = serde_json::to_string(user)?;

        let mut entries = vec![(keys::USER_DATA, user_json.as_str())];
        if let Some(token) = token {
            entries.push((keys::AUTH_TOKEN, token));
        }
        entries.push((keys::IS_LOGGED_IN, LOGGED_IN));

        self.storage.kv().multi_set(&entries).await
    }

    /// Clear the flag, user and token.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.storage.lock(keys::IS_LOGGED_IN).await;

        self.storage
            .kv()
            .multi_remove(&[keys::IS_LOGGED_IN, keys::USER_DATA, keys::AUTH_TOKEN])
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Logout failed"))?;

        tracing::info!("Logged out");
        Ok(())
    }

    /// The stored user, None on absence or read failure
    pub async fn get_user_data(&self) -> Option<UserData> {
        self.user.read_optional().await
    }

    /// The stored token, None on absence or read failure
    pub async fn get_auth_token(&self) -> Option<String> {
        match self.storage.kv().get(keys::AUTH_TOKEN).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read auth token");
                None
            }
        }
    }

    /// Flag, user and token in one record
    pub async fn get_auth_state(&self) -> AuthRecord {
        AuthRecord {
            is_logged_in: self.is_logged_in().await,
            user: self.get_user_data().await,
            token: self.get_auth_token().await,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
