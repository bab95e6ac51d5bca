//! Dispatch handlers for settings_* methods.
//!
//! The `settings_update_*` methods take the changed fields at the top level
//! of the arguments, e.g. `{ "theme": "dark" }`.

use super::dispatcher::{
    json_parse, ok_serialize, ok_success, parse_args, require_str, service_err, DResult,
};
use crate::settings::{
    DisplaySettingsUpdate, NotificationSettingsUpdate, PrivacySettingsUpdate, SettingsPatch,
};
use crate::GobiaCore;

/// Returns the complete settings record
pub async fn settings_get(core: &GobiaCore) -> DResult {
    ok_serialize(&core.settings().get_settings().await)
}

/// Args: any subset of `{ "notifications", "privacy", "display", "language" }`.
/// Each given section replaces the stored one.
pub async fn settings_save(core: &GobiaCore, args: &str) -> DResult {
    let patch: SettingsPatch = parse_args(args)?;
    core.settings().save_settings(patch).await.map_err(service_err)?;
    ok_success()
}

pub async fn settings_update_notifications(core: &GobiaCore, args: &str) -> DResult {
    let update: NotificationSettingsUpdate = parse_args(args)?;
    core.settings()
        .update_notification_settings(&update)
        .await
        .map_err(service_err)?;
    ok_success()
}

pub async fn settings_update_privacy(core: &GobiaCore, args: &str) -> DResult {
    let update: PrivacySettingsUpdate = parse_args(args)?;
    core.settings()
        .update_privacy_settings(&update)
        .await
        .map_err(service_err)?;
    ok_success()
}

pub async fn settings_update_display(core: &GobiaCore, args: &str) -> DResult {
    let update: DisplaySettingsUpdate = parse_args(args)?;
    core.settings()
        .update_display_settings(&update)
        .await
        .map_err(service_err)?;
    ok_success()
}

/// Args: `{ "language": "fr" }`
pub async fn settings_update_language(core: &GobiaCore, args: &str) -> DResult {
    let data = json_parse(args)?;
    let language = require_str(&data, "language")?;
    core.settings()
        .update_language(language)
        .await
        .map_err(service_err)?;
    ok_success()
}
