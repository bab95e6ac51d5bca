//! # Drafts Module
//!
//! Unpublished posts, including multi-part threads.
//!
//! Drafts are upserted by id. A new id lands at the head of the list; an
//! existing id is replaced where it stands, so editing a draft does not
//! reorder the drafts screen.
//!
//! `characterCount` belongs to the caller. The store persists whatever it is
//! given; [`Draft::new`] and [`remaining_characters`] compute it the way the
//! composer does.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{keys, Document, Storage};

/// Maximum post length, in UTF-16 code units
pub const MAX_POST_LENGTH: i64 = 280;

/// Characters left for `text`; negative once the text is too long.
///
/// Counted in UTF-16 code units, which is what the host's text input
/// reports.
pub fn remaining_characters(text: &str) -> i64 {
    MAX_POST_LENGTH - text.encode_utf16().count() as i64
}

/// A fresh time-based draft id (millisecond Unix time)
pub fn generate_draft_id() -> String {
    crate::time::now_timestamp_millis().to_string()
}

/// Kind of attached media
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A still image
    Image,
    /// A video clip
    Video,
}

/// A picked image or video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    /// Local URI of the file
    pub uri: String,
    /// Image or video
    #[serde(rename = "type")]
    pub media_type: MediaKind,
    /// Size in bytes
    pub size: u64,
    /// Original file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One follow-up post of a thread draft
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPost {
    /// Part id
    pub id: String,
    /// Part body
    pub text: String,
    /// Attachments for this part
    #[serde(default)]
    pub media: Vec<MediaAttachment>,
    /// Characters remaining for this part
    pub character_count: i64,
}

/// An unpublished post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Caller-supplied id, see [`generate_draft_id`]
    pub id: String,
    /// Post body
    pub text: String,
    /// Attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaAttachment>>,
    /// Last edit time
    pub timestamp: String,
    /// Characters remaining, as the composer last computed it
    pub character_count: i64,
    /// Follow-up posts when the draft is a thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_posts: Option<Vec<ThreadPost>>,
    /// Skill tags picked in the composer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_skills: Option<Vec<String>>,
    /// Community the draft will be posted to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_id: Option<String>,
    /// Display name of [`Draft::community_id`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_name: Option<String>,
}

impl Draft {
    /// A plain text draft stamped with the current time
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            character_count: remaining_characters(&text),
            text,
            media: None,
            timestamp: crate::time::now_rfc3339(),
            thread_posts: None,
            selected_skills: None,
            community_id: None,
            community_name: None,
        }
    }
}

/// Saves, lists and deletes drafts.
#[derive(Debug, Clone)]
pub struct DraftService {
    drafts: Document,
}

impl DraftService {
    /// Create the service over a storage handle
    pub fn new(storage: Storage) -> Self {
        Self {
            drafts: storage.document(keys::DRAFTS),
        }
    }

    /// Insert or replace a draft by id.
    pub async fn save_draft(&self, draft: &Draft) -> Result<()> {
        let mut replaced = false;
        self.drafts
            .update_entries(|drafts: &mut Vec<Draft>| {
                match drafts.iter_mut().find(|d| d.id == draft.id) {
                    Some(existing) => {
                        *existing = draft.clone();
                        replaced = true;
                    }
                    None => drafts.insert(0, draft.clone()),
                }
                true
            })
            .await
            .inspect_err(|e| {
                tracing::error!(draft_id = %draft.id, error = %e, "Failed to save draft")
            })?;

        tracing::debug!(draft_id = %draft.id, replaced, "Draft saved");
        Ok(())
    }

    /// All drafts. Empty on absence or failure.
    pub async fn get_drafts(&self) -> Vec<Draft> {
        self.drafts.read_entries().await
    }

    /// One draft by id
    pub async fn get_draft(&self, draft_id: &str) -> Option<Draft> {
        self.get_drafts()
            .await
            .into_iter()
            .find(|d| d.id == draft_id)
    }

    /// Delete a draft; unknown ids are ignored.
    pub async fn delete_draft(&self, draft_id: &str) -> Result<()> {
        let deleted = self
            .drafts
            .update_entries(|drafts: &mut Vec<Draft>| {
                let before = drafts.len();
                drafts.retain(|d| d.id != draft_id);
                drafts.len() != before
            })
            .await
            .inspect_err(|e| tracing::error!(draft_id, error = %e, "Failed to delete draft"))?;

        if deleted {
            tracing::debug!(draft_id, "Draft deleted");
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
