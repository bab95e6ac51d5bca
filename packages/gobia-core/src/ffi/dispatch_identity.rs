//! Dispatch handlers for auth_* and profile_* methods.

use super::dispatcher::{
    json_parse, ok_json, ok_serialize, ok_success, optional_str, require_field, service_err,
    DResult,
};
use crate::identity::{Profile, UserData};
use crate::GobiaCore;

/// Returns: `{ "isLoggedIn": bool }`
pub async fn auth_is_logged_in(core: &GobiaCore) -> DResult {
    let logged_in = core.auth().is_logged_in().await;
    ok_json(serde_json::json!({ "isLoggedIn": logged_in }))
}

/// Args: `{ "user": { "id", "email", "name"?, "handle"? }, "token"?: "..." }`
pub async fn auth_login(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let user: UserData = require_field(&data, "user")?;
    let token = optional_str(&data, "token");

    core.auth().login(&user, token).await.map_err(service_err)?;
    ok_success()
}

pub async fn auth_logout(core: &GobiaCore) -> DResult {
    core.auth().logout().await.map_err(service_err)?;
    ok_success()
}

/// Returns the stored user or `null`
pub async fn auth_get_user_data(core: &GobiaCore) -> DResult {
    ok_serialize(&core.auth().get_user_data().await)
}

/// Returns: `{ "token": "..." | null }`
pub async fn auth_get_token(core: &GobiaCore) -> DResult {
    let token = core.auth().get_auth_token().await;
    ok_json(serde_json::json!({ "token": token }))
}

/// Returns: `{ "isLoggedIn", "user", "token" }`
pub async fn auth_get_state(core: &GobiaCore) -> DResult {
    ok_serialize(&core.auth().get_auth_state().await)
}

/// Returns the stored profile or `null`
pub async fn profile_get(core: &GobiaCore) -> DResult {
    ok_serialize(&core.profile().get_profile().await)
}

/// Args: `{ "profile": { "name", "username", "bio", ... } }`
pub async fn profile_save(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let profile: Profile = require_field(&data, "profile")?;

    core.profile().save_profile(&profile).await.map_err(service_err)?;
    ok_success()
}
