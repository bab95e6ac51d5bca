//! Dispatch handlers for drafts_* methods.

use super::dispatcher::{
    json_parse, ok_json, ok_serialize, ok_success, require_field, require_str, service_err, DResult,
};
use crate::drafts::{self, Draft};
use crate::GobiaCore;

/// Args: `{ "draft": { ... } }`. Inserts or replaces by id.
pub async fn drafts_save(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let draft: Draft = require_field(&data, "draft")?;

    core.drafts().save_draft(&draft).await.map_err(service_err)?;
    ok_success()
}

pub async fn drafts_list(core: &GobiaCore) -> DResult {
    ok_serialize(&core.drafts().get_drafts().await)
}

/// Args: `{ "draftId": "..." }`. Returns the draft or `null`.
pub async fn drafts_get(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let draft_id = require_str(&data, "draftId")?;

    ok_serialize(&core.drafts().get_draft(draft_id).await)
}

/// Args: `{ "draftId": "..." }`
pub async fn drafts_delete(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let draft_id = require_str(&data, "draftId")?;

    core.drafts().delete_draft(draft_id).await.map_err(service_err)?;
    ok_success()
}

/// Returns: `{ "id": "..." }`
pub fn drafts_generate_id() -> DResult {
    ok_json(serde_json::json!({ "id": drafts::generate_draft_id() }))
}

/// Args: `{ "text": "..." }`. Returns: `{ "remaining": n }`
pub fn drafts_remaining_characters(args: &str) -> DResult {
    let data = json_parse(args)?;
    let text = require_str(&data, "text")?;

    ok_json(serde_json::json!({ "remaining": drafts::remaining_characters(text) }))
}
