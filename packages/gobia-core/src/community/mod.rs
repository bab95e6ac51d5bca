//! # Community Membership
//!
//! The set of communities the user has joined, kept as an ordered list of
//! ids without duplicates.

use crate::error::Result;
use crate::storage::{keys, Document, Storage};

/// Joins, leaves and lists communities.
#[derive(Debug, Clone)]
pub struct MembershipService {
    joined: Document,
}

impl MembershipService {
    /// Create the service over a storage handle
    pub fn new(storage: Storage) -> Self {
        Self {
            joined: storage.document(keys::JOINED_COMMUNITIES),
        }
    }

    /// Join a community. Joining twice keeps one membership.
    pub async fn join_community(&self, community_id: &str) -> Result<()> {
        let joined = self
            .joined
            .update_entries(|ids: &mut Vec<String>| {
                if ids.iter().any(|id| id == community_id) {
                    return false;
                }
                ids.push(community_id.to_string());
                true
            })
            .await
            .inspect_err(|e| {
                tracing::error!(community_id, error = %e, "Failed to join community")
            })?;

        if joined {
            tracing::debug!(community_id, "Joined community");
        }
        Ok(())
    }

    /// Leave a community. Leaving one that was never joined is a no-op.
    pub async fn leave_community(&self, community_id: &str) -> Result<()> {
        let left = self
            .joined
            .update_entries(|ids: &mut Vec<String>| {
                let before = ids.len();
                ids.retain(|id| id != community_id);
                ids.len() != before
            })
            .await
            .inspect_err(|e| {
                tracing::error!(community_id, error = %e, "Failed to leave community")
            })?;

        if left {
            tracing::debug!(community_id, "Left community");
        }
        Ok(())
    }

    /// Joined community ids in join order. Empty on absence or failure.
    pub async fn get_joined_communities(&self) -> Vec<String> {
        self.joined.read_entries().await
    }

    /// Whether `community_id` has been joined
    pub async fn is_joined(&self, community_id: &str) -> bool {
        self.get_joined_communities()
            .await
            .iter()
            .any(|id| id == community_id)
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

    #[tokio::test]
    async fn test_join_leave_scenario() {
        let service = MembershipService::new(Storage::in_memory());

        service.join_community("42").await.unwrap();
        assert!(service.is_joined("42").await);

        service.leave_community("42").await.unwrap();
        assert!(!service.is_joined("42").await);
    }

    #[tokio::test]
    async fn test_join_is_idempotent_and_ordered() {
        let service = MembershipService::new(Storage::in_memory());

        service.join_community("rust").await.unwrap();
        service.join_community("design").await.unwrap();
        service.join_community("rust").await.unwrap();

        assert_eq!(service.get_joined_communities().await, vec!["rust", "design"]);
    }

    #[tokio::test]
    async fn test_leave_absent_is_noop() {
        let storage = Storage::in_memory();
        let service = MembershipService::new(storage.clone());

        service.leave_community("ghost").await.unwrap();
        assert!(service.get_joined_communities().await.is_empty());
        // Nothing was written
        assert!(storage.kv().get(keys::JOINED_COMMUNITIES).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_string_ids_are_skipped() {
        let storage = Storage::in_memory();
        storage
            .kv()
            .set(keys::JOINED_COMMUNITIES, r#"["rust",7,"design"]"#)
            .await
            .unwrap();
        let service = MembershipService::new(storage.clone());

        assert_eq!(service.get_joined_communities().await, vec!["rust", "design"]);

        service.join_community("go").await.unwrap();
        assert_eq!(
            service.get_joined_communities().await,
            vec!["rust", "design", "go"]
        );
    }

    #[tokio::test]
    async fn test_read_failure_is_empty() {
        let flaky = Arc::new(FlakyStore::new());
        let service = MembershipService::new(Storage::new(flaky.clone()));
        service.join_community("7").await.unwrap();

        flaky.fail_reads(true);
        assert!(service.get_joined_communities().await.is_empty());
        assert!(!service.is_joined("7").await);
    }

    #[tokio::test]
    async fn test_write_failure_is_returned() {
        let flaky = Arc::new(FlakyStore::new());
        let service = MembershipService::new(Storage::new(flaky.clone()));

        flaky.fail_writes(true);
        assert!(service.join_community("7").await.is_err());

        flaky.fail_writes(false);
        assert!(!service.is_joined("7").await);
    }
}
