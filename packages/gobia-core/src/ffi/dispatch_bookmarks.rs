//! Dispatch handlers for bookmarks_* methods.

use super::dispatcher::{
    json_parse, ok_json, ok_serialize, ok_success, optional_str, require_field, require_str,
    service_err, DResult,
};
use crate::bookmarks::{Comment, Post};
use crate::GobiaCore;

/// Args: `{ "post": { ... } }`
pub async fn bookmarks_save_post(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let post: Post = require_field(&data, "post")?;

    core.bookmarks().save_post(&post).await.map_err(service_err)?;
    ok_success()
}

/// Args: `{ "postId": "..." }`
pub async fn bookmarks_remove_post(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let post_id = require_str(&data, "postId")?;

    core.bookmarks().remove_post(post_id).await.map_err(service_err)?;
    ok_success()
}

pub async fn bookmarks_get_posts(core: &GobiaCore) -> DResult {
    ok_serialize(&core.bookmarks().get_bookmarked_posts().await)
}

/// Returns: `{ "bookmarked": bool }`
pub async fn bookmarks_is_post_bookmarked(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let post_id = require_str(&data, "postId")?;

    let bookmarked = core.bookmarks().is_post_bookmarked(post_id).await;
    ok_json(serde_json::json!({ "bookmarked": bookmarked }))
}

/// Args: `{ "comment": { ... }, "postId"?: "...", "postTitle"?: "..." }`
pub async fn bookmarks_save_comment(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let comment: Comment = require_field(&data, "comment")?;
    let post_id = optional_str(&data, "postId");
    let post_title = optional_str(&data, "postTitle");

    core.bookmarks()
        .save_comment(&comment, post_id, post_title)
        .await
        .map_err(service_err)?;
    ok_success()
}

/// Args: `{ "commentId": "..." }`
pub async fn bookmarks_remove_comment(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let comment_id = require_str(&data, "commentId")?;

    core.bookmarks()
        .remove_comment(comment_id)
        .await
        .map_err(service_err)?;
    ok_success()
}

pub async fn bookmarks_get_comments(core: &GobiaCore) -> DResult {
    ok_serialize(&core.bookmarks().get_bookmarked_comments().await)
}

/// Returns: `{ "bookmarked": bool }`
pub async fn bookmarks_is_comment_bookmarked(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let comment_id = require_str(&data, "commentId")?;

    let bookmarked = core.bookmarks().is_comment_bookmarked(comment_id).await;
    ok_json(serde_json::json!({ "bookmarked": bookmarked }))
}

/// Args: `{ "posts": [ ... ] }`. Returns the posts with `saved` re-derived.
pub async fn bookmarks_sync_saved_flags(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let mut posts: Vec<Post> = require_field(&data, "posts")?;

    core.bookmarks().sync_saved_flags(&mut posts).await;
    ok_serialize(&posts)
}
