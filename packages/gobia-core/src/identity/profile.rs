//! # User Profile
//!
//! The singleton profile record edited on the profile screen.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          USER PROFILE                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  name, username, bio          required                                 │
//! │  location, website, avatarUri optional                                 │
//! │                                                                         │
//! │  save_profile() overwrites the whole record. Callers that want to     │
//! │  keep an optional field must pass it back in.                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{keys, Document, Storage};

/// User profile information
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Display name
    pub name: String,
    /// Handle
    pub username: String,
    /// Free-form bio
    pub bio: String,
    /// Optional location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Optional personal site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Optional avatar image URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_uri: Option<String>,
}

impl Profile {
    /// A profile with only the required fields
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        bio: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            bio: bio.into(),
            ..Self::default()
        }
    }
}

/// Reads and writes the singleton profile.
#[derive(Debug, Clone)]
pub struct ProfileService {
    profile: Document,
}

impl ProfileService {
    /// Create the service over a storage handle
    pub fn new(storage: Storage) -> Self {
        Self {
            profile: storage.document(keys::PROFILE),
        }
    }

    /// The saved profile. None if never saved or unreadable.
    pub async fn get_profile(&self) -> Option<Profile> {
        self.profile.read_optional().await
    }

    /// Replace the saved profile.
    pub async fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.profile
            .store(profile)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to save profile"))?;

        tracing::debug!(username = %profile.username, "Profile saved");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::FlakyStore;
    use std::sync::Arc;

    fn full_profile() -> Profile {
        Profile {
            name: "Ada".into(),
            username: "ada".into(),
            bio: "Building things".into(),
            location: Some("London".into()),
            website: Some("https://ada.dev".into()),
            avatar_uri: Some("file:///avatar.png".into()),
        }
    }

    #[tokio::test]
    async fn test_never_saved_is_none() {
        let service = ProfileService::new(Storage::in_memory());
        assert!(service.get_profile().await.is_none());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let service = ProfileService::new(Storage::in_memory());
        service.save_profile(&full_profile()).await.unwrap();
        assert_eq!(service.get_profile().await, Some(full_profile()));
    }

    #[tokio::test]
    async fn test_save_overwrites_optional_fields() {
        let service = ProfileService::new(Storage::in_memory());
        service.save_profile(&full_profile()).await.unwrap();

        // No merge: omitted optionals are gone
        service
            .save_profile(&Profile::new("Ada L.", "ada", "New bio"))
            .await
            .unwrap();

        let saved = service.get_profile().await.unwrap();
        assert_eq!(saved.name, "Ada L.");
        assert!(saved.location.is_none());
        assert!(saved.website.is_none());
        assert!(saved.avatar_uri.is_none());
    }

    #[tokio::test]
    async fn test_camel_case_layout() {
        let storage = Storage::in_memory();
        let service = ProfileService::new(storage.clone());
        service.save_profile(&full_profile()).await.unwrap();

        let raw = storage.kv().get(keys::PROFILE).await.unwrap().unwrap();
        assert!(raw.contains(r#""avatarUri":"file:///avatar.png""#), "{}", raw);
    }

    #[tokio::test]
    async fn test_save_failure_is_returned() {
        let flaky = Arc::new(FlakyStore::new());
        let service = ProfileService::new(Storage::new(flaky.clone()));

        flaky.fail_writes(true);
        assert!(service.save_profile(&full_profile()).await.is_err());

        flaky.fail_writes(false);
        assert!(service.get_profile().await.is_none());
    }
}
