//! Dispatch handlers for community_* methods.
//!
//! Args for the single-community methods: `{ "communityId": "..." }`

use super::dispatcher::{
    json_parse, ok_json, ok_serialize, ok_success, require_str, service_err, DResult,
};
use crate::GobiaCore;

pub async fn community_join(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let community_id = require_str(&data, "communityId")?;

    core.communities()
        .join_community(community_id)
        .await
        .map_err(service_err)?;
    ok_success()
}

pub async fn community_leave(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let community_id = require_str(&data, "communityId")?;

    core.communities()
        .leave_community(community_id)
        .await
        .map_err(service_err)?;
    ok_success()
}

/// Returns the joined ids as a JSON array
pub async fn community_list(core: &GobiaCore) -> DResult {
    ok_serialize(&core.communities().get_joined_communities().await)
}

/// Returns: `{ "joined": bool }`
pub async fn community_is_joined(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let community_id = require_str(&data, "communityId")?;

    let joined = core.communities().is_joined(community_id).await;
    ok_json(serde_json::json!({ "joined": joined }))
}
