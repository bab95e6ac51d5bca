//! # FFI Dispatcher
//!
//! JSON-RPC style dispatcher that routes method names to service calls.
//! Called from `gobia_call(method, args)` in c_api.rs, and usable directly
//! by hosts that embed the crate.
//!
//! Handler implementations live in domain sub-modules:
//!   - `dispatch_identity`: auth_* and profile_* methods
//!   - `dispatch_settings`: settings_* methods
//!   - `dispatch_community`: community_* methods
//!   - `dispatch_bookmarks`: bookmarks_* methods
//!   - `dispatch_drafts`: drafts_* methods
//!
//! Returns `Ok(json_string)` on success, `Err((error_code, message))` on failure.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 1 | Arguments are not valid JSON, or a field has the wrong shape |
//! | 2 | A required field is missing |
//! | 404 | Unknown method |
//! | other | [`Error::code`](crate::Error::code) of the failed write |

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    dispatch_bookmarks, dispatch_community, dispatch_drafts, dispatch_identity, dispatch_settings,
};
use crate::GobiaCore;

/// Dispatcher result: JSON text or `(code, message)`
pub type DResult = Result<String, (i32, String)>;

// ============================================================================
// HELPERS  (pub(super) so domain modules can use them)
// ============================================================================

pub(super) fn err(code: i32, msg: impl ToString) -> (i32, String) {
    (code, msg.to_string())
}

/// Map a service error to its dispatcher code
pub(super) fn service_err(e: crate::Error) -> (i32, String) {
    (e.code(), e.to_string())
}

pub(super) fn json_parse(args: &str) -> Result<serde_json::Value, (i32, String)> {
    if args.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }
    serde_json::from_str(args).map_err(|e| err(1, format!("Invalid JSON: {}", e)))
}

pub(super) fn require_str<'a>(
    data: &'a serde_json::Value,
    field: &str,
) -> Result<&'a str, (i32, String)> {
    data[field].as_str().ok_or_else(|| err(2, format!("Missing {}", field)))
}

pub(super) fn optional_str<'a>(data: &'a serde_json::Value, field: &str) -> Option<&'a str> {
    data[field].as_str()
}

/// Deserialize a required object field
pub(super) fn require_field<T: DeserializeOwned>(
    data: &serde_json::Value,
    field: &str,
) -> Result<T, (i32, String)> {
    let value = data
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| err(2, format!("Missing {}", field)))?;
    T::deserialize(value).map_err(|e| err(1, format!("Invalid {}: {}", field, e)))
}

/// Deserialize the whole argument object
pub(super) fn parse_args<T: DeserializeOwned>(args: &str) -> Result<T, (i32, String)> {
    let data = json_parse(args)?;
    T::deserialize(data).map_err(|e| err(1, format!("Invalid arguments: {}", e)))
}

pub(super) fn ok_json(v: serde_json::Value) -> DResult {
    Ok(v.to_string())
}

pub(super) fn ok_serialize<T: Serialize + ?Sized>(value: &T) -> DResult {
    serde_json::to_string(value).map_err(|e| service_err(e.into()))
}

pub(super) fn ok_success() -> DResult {
    Ok(r#"{"success":true}"#.to_string())
}

// ============================================================================
// ROUTING
// ============================================================================

/// Route `method` with JSON `args` to the matching service call.
pub async fn dispatch(core: &GobiaCore, method: &str, args: &str) -> DResult {
    match method {
        // Core
        "core_version" => ok_serialize(&crate::build_info()),

        // Auth
        "auth_is_logged_in" => dispatch_identity::auth_is_logged_in(core).await,
        "auth_login" => dispatch_identity::auth_login(core, args).await,
        "auth_logout" => dispatch_identity::auth_logout(core).await,
        "auth_get_user_data" => dispatch_identity::auth_get_user_data(core).await,
        "auth_get_token" => dispatch_identity::auth_get_token(core).await,
        "auth_get_state" => dispatch_identity::auth_get_state(core).await,

        // Profile
        "profile_get" => dispatch_identity::profile_get(core).await,
        "profile_save" => dispatch_identity::profile_save(core, args).await,

        // Settings
        "settings_get" => dispatch_settings::settings_get(core).await,
        "settings_save" => dispatch_settings::settings_save(core, args).await,
        "settings_update_notifications" => {
            dispatch_settings::settings_update_notifications(core, args).await
        }
        "settings_update_privacy" => dispatch_settings::settings_update_privacy(core, args).await,
        "settings_update_display" => dispatch_settings::settings_update_display(core, args).await,
        "settings_update_language" => dispatch_settings::settings_update_language(core, args).await,

        // Communities
        "community_join" => dispatch_community::community_join(core, args).await,
        "community_leave" => dispatch_community::community_leave(core, args).await,
        "community_list" => dispatch_community::community_list(core).await,
        "community_is_joined" => dispatch_community::community_is_joined(core, args).await,

        // Bookmarks
        "bookmarks_save_post" => dispatch_bookmarks::bookmarks_save_post(core, args).await,
        "bookmarks_remove_post" => dispatch_bookmarks::bookmarks_remove_post(core, args).await,
        "bookmarks_get_posts" => dispatch_bookmarks::bookmarks_get_posts(core).await,
        "bookmarks_is_post_bookmarked" => {
            dispatch_bookmarks::bookmarks_is_post_bookmarked(core, args).await
        }
        "bookmarks_save_comment" => dispatch_bookmarks::bookmarks_save_comment(core, args).await,
        "bookmarks_remove_comment" => {
            dispatch_bookmarks::bookmarks_remove_comment(core, args).await
        }
        "bookmarks_get_comments" => dispatch_bookmarks::bookmarks_get_comments(core).await,
        "bookmarks_is_comment_bookmarked" => {
            dispatch_bookmarks::bookmarks_is_comment_bookmarked(core, args).await
        }
        "bookmarks_sync_saved_flags" => {
            dispatch_bookmarks::bookmarks_sync_saved_flags(core, args).await
        }

        // Drafts
        "drafts_save" => dispatch_drafts::drafts_save(core, args).await,
        "drafts_list" => dispatch_drafts::drafts_list(core).await,
        "drafts_get" => dispatch_drafts::drafts_get(core, args).await,
        "drafts_delete" => dispatch_drafts::drafts_delete(core, args).await,
        "drafts_generate_id" => dispatch_drafts::drafts_generate_id(),
        "drafts_remaining_characters" => dispatch_drafts::drafts_remaining_characters(args),

        _ => Err(err(404, format!("Unknown method: {}", method))),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::FlakyStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn call(core: &GobiaCore, method: &str, args: Value) -> Value {
        let out = dispatch(core, method, &args.to_string()).await.unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let core = GobiaCore::in_memory();
        let (code, _) = dispatch(&core, "nope", "{}").await.unwrap_err();
        assert_eq!(code, 404);
    }

    #[tokio::test]
    async fn test_argument_errors() {
        let core = GobiaCore::in_memory();

        let (code, _) = dispatch(&core, "community_join", "{not json").await.unwrap_err();
        assert_eq!(code, 1);

        let (code, msg) = dispatch(&core, "community_join", "{}").await.unwrap_err();
        assert_eq!(code, 2);
        assert!(msg.contains("communityId"), "{}", msg);

        let (code, _) = dispatch(&core, "drafts_save", r#"{"draft":{"id":"1"}}"#)
            .await
            .unwrap_err();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn test_empty_args_for_getters() {
        let core = GobiaCore::in_memory();
        let out = dispatch(&core, "community_list", "").await.unwrap();
        assert_eq!(out, "[]");
    }

    #[tokio::test]
    async fn test_auth_round_trip() {
        let core = GobiaCore::in_memory();

        call(
            &core,
            "auth_login",
            json!({ "user": { "id": "u-1", "email": "a@example.com" }, "token": "t" }),
        )
        .await;
        assert_eq!(call(&core, "auth_is_logged_in", json!({})).await["isLoggedIn"], true);
        assert_eq!(call(&core, "auth_get_token", json!({})).await["token"], "t");

        let state = call(&core, "auth_get_state", json!({})).await;
        assert_eq!(state["user"]["email"], "a@example.com");

        call(&core, "auth_logout", json!({})).await;
        assert_eq!(call(&core, "auth_get_user_data", json!({})).await, Value::Null);
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let core = GobiaCore::in_memory();
        assert_eq!(call(&core, "profile_get", json!({})).await, Value::Null);

        let profile = json!({
            "name": "Ada",
            "username": "ada",
            "bio": "",
            "website": "https://ada.dev"
        });
        call(&core, "profile_save", json!({ "profile": profile })).await;
        assert_eq!(call(&core, "profile_get", json!({})).await, profile);
    }

    #[tokio::test]
    async fn test_settings_partial_updates() {
        let core = GobiaCore::in_memory();

        call(&core, "settings_update_display", json!({ "theme": "dark" })).await;
        call(&core, "settings_update_privacy", json!({ "showEmail": true })).await;
        call(&core, "settings_update_language", json!({ "language": "fr" })).await;

        let settings = call(&core, "settings_get", json!({})).await;
        assert_eq!(settings["display"]["theme"], "dark");
        assert_eq!(settings["display"]["fontSize"], "medium");
        assert_eq!(settings["privacy"]["showEmail"], true);
        assert_eq!(settings["privacy"]["allowMessages"], true);
        assert_eq!(settings["language"], "fr");

        call(
            &core,
            "settings_save",
            json!({ "notifications": { "likes": false } }),
        )
        .await;
        let settings = call(&core, "settings_get", json!({})).await;
        assert_eq!(settings["notifications"]["likes"], false);
        assert_eq!(settings["language"], "fr");
    }

    #[tokio::test]
    async fn test_community_round_trip() {
        let core = GobiaCore::in_memory();

        call(&core, "community_join", json!({ "communityId": "42" })).await;
        assert_eq!(call(&core, "community_list", json!({})).await, json!(["42"]));
        assert_eq!(
            call(&core, "community_is_joined", json!({ "communityId": "42" })).await["joined"],
            true
        );

        call(&core, "community_leave", json!({ "communityId": "42" })).await;
        assert_eq!(call(&core, "community_list", json!({})).await, json!([]));
    }

    #[tokio::test]
    async fn test_bookmarks_round_trip() {
        let core = GobiaCore::in_memory();
        let post = json!({
            "id": "p1", "name": "Grace", "handle": "grace", "text": "hi",
            "likes": 3, "views": "1.2K", "saved": false
        });

        call(&core, "bookmarks_save_post", json!({ "post": post })).await;
        let posts = call(&core, "bookmarks_get_posts", json!({})).await;
        assert_eq!(posts[0]["id"], "p1");
        assert_eq!(posts[0]["views"], "1.2K");
        assert!(posts[0]["savedAt"].is_string());

        let synced = call(
            &core,
            "bookmarks_sync_saved_flags",
            json!({ "posts": [post, { "id": "p2", "name": "n", "handle": "h", "text": "t" }] }),
        )
        .await;
        assert_eq!(synced[0]["saved"], true);
        assert_eq!(synced[1]["saved"], false);

        let comment = json!({ "id": "c1", "name": "Linus", "handle": "linus", "text": "+1" });
        call(
            &core,
            "bookmarks_save_comment",
            json!({ "comment": comment, "postId": "p1", "postTitle": "hi" }),
        )
        .await;
        let comments = call(&core, "bookmarks_get_comments", json!({})).await;
        assert_eq!(comments[0]["postId"], "p1");
        assert_eq!(
            call(&core, "bookmarks_is_comment_bookmarked", json!({ "commentId": "c1" })).await
                ["bookmarked"],
            true
        );

        call(&core, "bookmarks_remove_post", json!({ "postId": "p1" })).await;
        call(&core, "bookmarks_remove_comment", json!({ "commentId": "c1" })).await;
        assert_eq!(
            call(&core, "bookmarks_is_post_bookmarked", json!({ "postId": "p1" })).await
                ["bookmarked"],
            false
        );
        assert_eq!(call(&core, "bookmarks_get_comments", json!({})).await, json!([]));
    }

    #[tokio::test]
    async fn test_drafts_round_trip() {
        let core = GobiaCore::in_memory();
        let draft = |id: &str, text: &str| {
            json!({
                "id": id, "text": text, "timestamp": "2026-10-19T08:00:00.000Z",
                "characterCount": 280 - text.len() as i64
            })
        };

        call(&core, "drafts_save", json!({ "draft": draft("1", "a") })).await;
        call(&core, "drafts_save", json!({ "draft": draft("2", "b") })).await;
        call(&core, "drafts_save", json!({ "draft": draft("1", "edited") })).await;

        let drafts = call(&core, "drafts_list", json!({})).await;
        assert_eq!(drafts[0]["id"], "2");
        assert_eq!(drafts[1]["text"], "edited");

        assert_eq!(call(&core, "drafts_get", json!({ "draftId": "2" })).await["text"], "b");
        call(&core, "drafts_delete", json!({ "draftId": "2" })).await;
        assert_eq!(call(&core, "drafts_get", json!({ "draftId": "2" })).await, Value::Null);

        let remaining = call(&core, "drafts_remaining_characters", json!({ "text": "abc" })).await;
        assert_eq!(remaining["remaining"], 277);
        assert!(call(&core, "drafts_generate_id", json!({})).await["id"].is_string());
    }

    #[tokio::test]
    async fn test_write_failure_code() {
        let flaky = Arc::new(FlakyStore::new());
        let core = GobiaCore::with_store(flaky.clone());

        flaky.fail_writes(true);
        let (code, _) = dispatch(&core, "community_join", r#"{"communityId":"1"}"#)
            .await
            .unwrap_err();
        assert_eq!(code, 402);
    }

    #[tokio::test]
    async fn test_core_version() {
        let core = GobiaCore::in_memory();
        let info = call(&core, "core_version", json!({})).await;
        assert_eq!(info["version"], crate::version());
    }
}
