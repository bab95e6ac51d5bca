//! # Bookmarks Module
//!
//! Saved copies of posts and comments.
//!
//! ## Collections
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         BOOKMARK STORE                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  @gobia_bookmarked_posts      [ newest, ..., oldest ]                  │
//! │  @gobia_bookmarked_comments   [ newest, ..., oldest ]                  │
//! │                                                                         │
//! │  save_*    ──► copy the visible fields, stamp savedAt, prepend         │
//! │               (id already saved → nothing happens)                     │
//! │  remove_*  ──► drop the matching id (absent → nothing happens)         │
//! │                                                                         │
//! │  A bookmark is a snapshot: later edits to the post do not reach it,   │
//! │  and a comment's postId is a plain id with no cascade.                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{keys, Document, Storage};

/// An engagement counter as the feed shows it: a number, or a display
/// string such as `"1.2K"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Count {
    /// Exact count
    Number(u64),
    /// Pre-formatted count
    Text(String),
}

impl From<u64> for Count {
    fn from(n: u64) -> Self {
        Count::Number(n)
    }
}

impl From<&str> for Count {
    fn from(s: &str) -> Self {
        Count::Text(s.to_string())
    }
}

/// A post as the feed renders it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post id
    pub id: String,
    /// Author display name
    pub name: String,
    /// Author handle
    pub handle: String,
    /// Post body
    pub text: String,
    /// Absolute post time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Relative time label ("2h")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Like count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Count>,
    /// Comment count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Count>,
    /// Repost count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<Count>,
    /// View count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<Count>,
    /// UI flag; see [`BookmarkService::sync_saved_flags`]
    #[serde(default)]
    pub saved: bool,
}

/// A comment as the thread view renders it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment id
    pub id: String,
    /// Author display name
    pub name: String,
    /// Author handle
    pub handle: String,
    /// Comment body
    pub text: String,
    /// Absolute comment time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Relative time label, e.g. `2h`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Like count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Count>,
    /// Comment count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Count>,
    /// Repost count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<Count>,
    /// View count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<Count>,
}

/// A saved post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedPost {
    /// Post id
    pub id: String,
    /// Author display name
    pub name: String,
    /// Author handle
    pub handle: String,
    /// Post body
    pub text: String,
    /// Absolute post time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Relative time label, e.g. `2h`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Like count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Count>,
    /// Comment count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Count>,
    /// Repost count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<Count>,
    /// View count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<Count>,
    /// When the bookmark was created (RFC 3339)
    pub saved_at: String,
}

impl BookmarkedPost {
    /// Snapshot `post`, stamped with `saved_at`
    pub fn from_post(post: &Post, saved_at: String) -> Self {
        Self {
            id: post.id.clone(),
            name: post.name.clone(),
            handle: post.handle.clone(),
            text: post.text.clone(),
            timestamp: post.timestamp.clone(),
            time: post.time.clone(),
            likes: post.likes.clone(),
            comments: post.comments.clone(),
            reposts: post.reposts.clone(),
            views: post.views.clone(),
            saved_at,
        }
    }
}

/// A saved comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedComment {
    /// Comment id
    pub id: String,
    /// Author display name
    pub name: String,
    /// Author handle
    pub handle: String,
    /// Comment body
    pub text: String,
    /// Absolute comment time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Relative time label, e.g. `2h`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Like count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Count>,
    /// Comment count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Count>,
    /// Repost count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<Count>,
    /// View count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<Count>,
    /// Post the comment belongs to; lookup only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    /// Title shown for the parent post
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_title: Option<String>,
    /// When the bookmark was created (RFC 3339)
    pub saved_at: String,
}

impl BookmarkedComment {
    /// Snapshot `comment`, stamped with `saved_at`
    pub fn from_comment(
        comment: &Comment,
        post_id: Option<&str>,
        post_title: Option<&str>,
        saved_at: String,
    ) -> Self {
        Self {
            id: comment.id.clone(),
            name: comment.name.clone(),
            handle: comment.handle.clone(),
            text: comment.text.clone(),
            timestamp: comment.timestamp.clone(),
            time: comment.time.clone(),
            likes: comment.likes.clone(),
            comments: comment.comments.clone(),
            reposts: comment.reposts.clone(),
            views: comment.views.clone(),
            post_id: post_id.map(str::to_string),
            post_title: post_title.map(str::to_string),
            saved_at,
        }
    }
}

/// Anything stored in a bookmark collection
trait Bookmark {
    fn id(&self) -> &str;
}

impl Bookmark for BookmarkedPost {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Bookmark for BookmarkedComment {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Prepend `entry` unless its id is already present
fn insert_at_head<B: Bookmark>(list: &mut Vec<B>, entry: B) -> bool {
    if list.iter().any(|b| b.id() == entry.id()) {
        return false;
    }
    list.insert(0, entry);
    true
}

/// Drop the entry with `id`, reporting whether one existed
fn remove_by_id<B: Bookmark>(list: &mut Vec<B>, id: &str) -> bool {
    let before = list.len();
    list.retain(|b| b.id() != id);
    list.len() != before
}

/// Saves, removes and lists bookmarked posts and comments.
#[derive(Debug, Clone)]
pub struct BookmarkService {
    posts: Document,
    comments: Document,
}

impl BookmarkService {
    /// Create the service over a storage handle
    pub fn new(storage: Storage) -> Self {
        Self {
            posts: storage.document(keys::BOOKMARKED_POSTS),
            comments: storage.document(keys::BOOKMARKED_COMMENTS),
        }
    }

    // ========================================================================
    // POSTS
    // ========================================================================

    /// Bookmark a post. Saving an already bookmarked id is a no-op and keeps
    /// the original `savedAt`.
    pub async fn save_post(&self, post: &Post) -> Result<()> {
        let added = self
            .posts
            .update_entries(|list: &mut Vec<BookmarkedPost>| {
                insert_at_head(list, BookmarkedPost::from_post(post, crate::time::now_rfc3339()))
            })
            .await
            .inspect_err(|e| {
                tracing::error!(post_id = %post.id, error = %e, "Failed to bookmark post")
            })?;

        if added {
            tracing::debug!(post_id = %post.id, "Post bookmarked");
        }
        Ok(())
    }

    /// Remove a post bookmark; unknown ids are ignored.
    pub async fn remove_post(&self, post_id: &str) -> Result<()> {
        self.posts
            .update_entries(|list: &mut Vec<BookmarkedPost>| remove_by_id(list, post_id))
            .await
            .inspect_err(|e| {
                tracing::error!(post_id, error = %e, "Failed to remove post bookmark")
            })?;
        Ok(())
    }

    /// Bookmarked posts, most recently saved first. Empty on failure.
    pub async fn get_bookmarked_posts(&self) -> Vec<BookmarkedPost> {
        self.posts.read_entries().await
    }

    /// Whether a post is bookmarked
    pub async fn is_post_bookmarked(&self, post_id: &str) -> bool {
        self.get_bookmarked_posts()
            .await
            .iter()
            .any(|b| b.id == post_id)
    }

    /// Set each post's `saved` flag from the bookmark collection.
    ///
    /// The feed passes post objects around with their own `saved` flag;
    /// this re-derives it with a single read instead of trusting it.
    pub async fn sync_saved_flags(&self, posts: &mut [Post]) {
        let saved = self.get_bookmarked_posts().await;
        for post in posts.iter_mut() {
            post.saved = saved.iter().any(|b| b.id == post.id);
        }
    }

    // ========================================================================
    // COMMENTS
    // ========================================================================

    /// Bookmark a comment, optionally remembering its parent post.
    pub async fn save_comment(
        &self,
        comment: &Comment,
        post_id: Option<&str>,
        post_title: Option<&str>,
    ) -> Result<()> {
        let added = self
            .comments
            .update_entries(|list: &mut Vec<BookmarkedComment>| {
                let entry = BookmarkedComment::from_comment(
                    comment,
                    post_id,
                    post_title,
                    crate::time::now_rfc3339(),
                );
                insert_at_head(list, entry)
            })
            .await
            .inspect_err(|e| {
                tracing::error!(comment_id = %comment.id, error = %e, "Failed to bookmark comment")
            })?;

        if added {
            tracing::debug!(comment_id = %comment.id, "Comment bookmarked");
        }
        Ok(())
    }

    /// Remove a comment bookmark; unknown ids are ignored.
    pub async fn remove_comment(&self, comment_id: &str) -> Result<()> {
        self.comments
            .update_entries(|list: &mut Vec<BookmarkedComment>| {
                remove_by_id(list, comment_id)
            })
            .await
            .inspect_err(|e| {
                tracing::error!(comment_id, error = %e, "Failed to remove comment bookmark")
            })?;
        Ok(())
    }

    /// Bookmarked comments, most recently saved first. Empty on failure.
    pub async fn get_bookmarked_comments(&self) -> Vec<BookmarkedComment> {
        self.comments.read_entries().await
    }

    /// Whether a comment is bookmarked
    pub async fn is_comment_bookmarked(&self, comment_id: &str) -> bool {
        self.get_bookmarked_comments()
            .await
            .iter()
            .any(|b| b.id == comment_id)
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

    fn post(id: &str) -> Post {
        Post {
            id: id.into(),
            name: "Grace".into(),
            handle: "grace".into(),
            text: format!("post {}", id),
            time: Some("2h".into()),
            likes: Some(Count::Number(12)),
            views: Some(Count::from("1.2K")),
            ..Post::default()
        }
    }

    fn comment(id: &str) -> Comment {
        Comment {
            id: id.into(),
            name: "Linus".into(),
            handle: "linus".into(),
            text: format!("comment {}", id),
            ..Comment::default()
        }
    }

    #[tokio::test]
    async fn test_save_post_is_idempotent() {
        let service = BookmarkService::new(Storage::in_memory());

        service.save_post(&post("p1")).await.unwrap();
        let first = service.get_bookmarked_posts().await;

        service.save_post(&post("p1")).await.unwrap();
        let second = service.get_bookmarked_posts().await;

        assert_eq!(second.len(), 1);
        // savedAt is never re-stamped
        assert_eq!(first[0].saved_at, second[0].saved_at);
    }

    #[tokio::test]
    async fn test_newest_first() {
        let service = BookmarkService::new(Storage::in_memory());

        service.save_post(&post("a")).await.unwrap();
        service.save_post(&post("b")).await.unwrap();

        let ids: Vec<String> = service
            .get_bookmarked_posts()
            .await
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_snapshot_copies_fields() {
        let service = BookmarkService::new(Storage::in_memory());
        service.save_post(&post("p1")).await.unwrap();

        let saved = &service.get_bookmarked_posts().await[0];
        assert_eq!(saved.text, "post p1");
        assert_eq!(saved.time.as_deref(), Some("2h"));
        assert_eq!(saved.likes, Some(Count::Number(12)));
        assert_eq!(saved.views, Some(Count::Text("1.2K".into())));
        assert!(chrono::DateTime::parse_from_rfc3339(&saved.saved_at).is_ok());
    }

    #[tokio::test]
    async fn test_remove_post() {
        let service = BookmarkService::new(Storage::in_memory());
        service.save_post(&post("p1")).await.unwrap();
        service.save_post(&post("p2")).await.unwrap();

        service.remove_post("p1").await.unwrap();
        assert!(!service.is_post_bookmarked("p1").await);
        assert!(service.is_post_bookmarked("p2").await);
    }

    #[tokio::test]
    async fn test_remove_absent_comment_is_noop() {
        let service = BookmarkService::new(Storage::in_memory());
        service.save_comment(&comment("c1"), None, None).await.unwrap();

        service.remove_comment("nonexistent").await.unwrap();

        let comments = service.get_bookmarked_comments().await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, "c1");
    }

    #[tokio::test]
    async fn test_comment_keeps_parent_reference() {
        let service = BookmarkService::new(Storage::in_memory());
        service
            .save_comment(&comment("c1"), Some("p9"), Some("Shipping v2"))
            .await
            .unwrap();
        service.save_comment(&comment("c2"), None, None).await.unwrap();

        let comments = service.get_bookmarked_comments().await;
        assert_eq!(comments[0].id, "c2");
        assert!(comments[0].post_id.is_none());
        assert_eq!(comments[1].post_id.as_deref(), Some("p9"));
        assert_eq!(comments[1].post_title.as_deref(), Some("Shipping v2"));
        assert!(service.is_comment_bookmarked("c1").await);
    }

    #[tokio::test]
    async fn test_posts_and_comments_are_separate() {
        let service = BookmarkService::new(Storage::in_memory());
        service.save_post(&post("same")).await.unwrap();

        assert!(service.is_post_bookmarked("same").await);
        assert!(!service.is_comment_bookmarked("same").await);
    }

    #[tokio::test]
    async fn test_sync_saved_flags() {
        let service = BookmarkService::new(Storage::in_memory());
        service.save_post(&post("p2")).await.unwrap();

        let mut feed = vec![post("p1"), post("p2")];
        feed[0].saved = true; // stale flag from the UI

        service.sync_saved_flags(&mut feed).await;
        assert!(!feed[0].saved);
        assert!(feed[1].saved);
    }

    #[tokio::test]
    async fn test_stored_layout() {
        let storage = Storage::in_memory();
        let service = BookmarkService::new(storage.clone());
        service.save_post(&post("p1")).await.unwrap();

        let raw = storage.kv().get(keys::BOOKMARKED_POSTS).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], "p1");
        assert_eq!(value[0]["likes"], 12);
        assert_eq!(value[0]["views"], "1.2K");
        assert!(value[0]["savedAt"].is_string());
        // The UI flag is not part of the bookmark
        assert!(value[0].get("saved").is_none());
    }

    #[tokio::test]
    async fn test_unreadable_bookmark_does_not_drop_the_rest() {
        let storage = Storage::in_memory();
        let service = BookmarkService::new(storage.clone());
        service.save_post(&post("p1")).await.unwrap();

        let raw = storage.kv().get(keys::BOOKMARKED_POSTS).await.unwrap().unwrap();
        let mut stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        stored.push(serde_json::json!({ "id": 5 }));
        storage
            .kv()
            .set(keys::BOOKMARKED_POSTS, &serde_json::to_string(&stored).unwrap())
            .await
            .unwrap();

        assert!(service.is_post_bookmarked("p1").await);

        service.save_post(&post("p2")).await.unwrap();
        let ids: Vec<String> = service
            .get_bookmarked_posts()
            .await
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[tokio::test]
    async fn test_read_failure_is_empty() {
        let flaky = Arc::new(FlakyStore::new());
        let service = BookmarkService::new(Storage::new(flaky.clone()));
        service.save_post(&post("p1")).await.unwrap();

        flaky.fail_reads(true);
        assert!(service.get_bookmarked_posts().await.is_empty());
        assert!(!service.is_post_bookmarked("p1").await);
    }

    #[tokio::test]
    async fn test_save_with_failed_read_keeps_existing() {
        let flaky = Arc::new(FlakyStore::new());
        let service = BookmarkService::new(Storage::new(flaky.clone()));
        service.save_post(&post("p1")).await.unwrap();

        flaky.fail_reads(true);
        assert!(service.save_post(&post("p2")).await.is_err());

        flaky.fail_reads(false);
        let ids: Vec<String> = service
            .get_bookmarked_posts()
            .await
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["p1"]);
    }

    #[tokio::test]
    async fn test_concurrent_saves_keep_every_entry() {
        let service = BookmarkService::new(Storage::in_memory());

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.save_post(&post(&format!("p{}", i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(service.get_bookmarked_posts().await.len(), 16);
    }
}
