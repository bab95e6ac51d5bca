//! # Settings Module
//!
//! The singleton, sectioned settings record.
//!
//! ## Merge Rules
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SETTINGS MERGE                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Read:   stored JSON ──over──► defaults  ──► complete Settings         │
//! │          (missing sections and fields take their default)              │
//! │                                                                         │
//! │  save_settings(patch):                                                 │
//! │          every section present in the patch REPLACES the stored       │
//! │          section wholesale; absent sections are untouched             │
//! │                                                                         │
//! │  update_*_settings(update):                                            │
//! │          current section + fields of update ──► complete section      │
//! │          ──► save_settings({ section })                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each section of the stored record is parsed on its own. A section that
//! no longer parses reads as its defaults (and is replaced by the next
//! write) without disturbing the others. A record that is not a JSON object
//! reads as the defaults.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::storage::{keys, Document, Storage};

/// Default UI language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Color theme
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
    /// Follow the OS
    Auto,
}

/// Text size
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    /// Small text
    Small,
    /// Medium text
    #[default]
    Medium,
    /// Large text
    Large,
}

/// Which activity produces a notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    /// Someone liked a post
    pub likes: bool,
    /// Someone commented
    pub comments: bool,
    /// New follower
    pub follows: bool,
    /// Mentioned in a post
    pub mentions: bool,
    /// A post was reposted
    pub reposts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            likes: true,
            comments: true,
            follows: true,
            mentions: true,
            reposts: true,
        }
    }
}

/// What other users can see and do
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    /// Email visible on the profile
    pub show_email: bool,
    /// Location visible on the profile
    pub show_location: bool,
    /// Direct messages allowed
    pub allow_messages: bool,
    /// Mentions allowed
    pub allow_mentions: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            show_email: false,
            show_location: true,
            allow_messages: true,
            allow_mentions: true,
        }
    }
}

/// Display preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    /// Color theme
    pub theme: Theme,
    /// Text size
    pub font_size: FontSize,
    /// Disable animations
    pub reduce_motion: bool,
}

/// The complete settings record
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Notification toggles
    pub notifications: NotificationSettings,
    /// Privacy toggles
    pub privacy: PrivacySettings,
    /// Display preferences
    pub display: DisplaySettings,
    /// UI language code
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: NotificationSettings::default(),
            privacy: PrivacySettings::default(),
            display: DisplaySettings::default(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let stored = Map::<String, Value>::deserialize(deserializer)?;

        let mut settings = Settings::default();
        read_section(&stored, "notifications", &mut settings.notifications);
        read_section(&stored, "privacy", &mut settings.privacy);
        read_section(&stored, "display", &mut settings.display);
        read_section(&stored, "language", &mut settings.language);
        Ok(settings)
    }
}

/// Overwrite `slot` with the stored section when it parses; keep the
/// default otherwise.
fn read_section<T: DeserializeOwned>(stored: &Map<String, Value>, name: &str, slot: &mut T) {
    let Some(value) = stored.get(name) else {
        return;
    };
    match T::deserialize(value) {
        Ok(section) => *slot = section,
        Err(e) => {
            tracing::warn!(section = name, error = %e, "Discarding unreadable settings section")
        }
    }
}

/// A partial settings write: each present section replaces the stored one
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    /// Replacement notification section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationSettings>,
    /// Replacement privacy section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<PrivacySettings>,
    /// Replacement display section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplaySettings>,
    /// Replacement language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl SettingsPatch {
    /// Shallow-merge the patch over `settings`
    pub fn apply_to(self, settings: &mut Settings) {
        if let Some(notifications) = self.notifications {
            settings.notifications = notifications;
        }
        if let Some(privacy) = self.privacy {
            settings.privacy = privacy;
        }
        if let Some(display) = self.display {
            settings.display = display;
        }
        if let Some(language) = self.language {
            settings.language = language;
        }
    }
}

/// Field-level change to the notification section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettingsUpdate {
    /// New value for [`NotificationSettings::likes`], if changing
    pub likes: Option<bool>,
    /// New value for [`NotificationSettings::comments`], if changing
    pub comments: Option<bool>,
    /// New value for [`NotificationSettings::follows`], if changing
    pub follows: Option<bool>,
    /// New value for [`NotificationSettings::mentions`], if changing
    pub mentions: Option<bool>,
    /// New value for [`NotificationSettings::reposts`], if changing
    pub reposts: Option<bool>,
}

impl NotificationSettingsUpdate {
    /// `current` with the given fields replaced
    pub fn apply(&self, current: &NotificationSettings) -> NotificationSettings {
        NotificationSettings {
            likes: self.likes.unwrap_or(current.likes),
            comments: self.comments.unwrap_or(current.comments),
            follows: self.follows.unwrap_or(current.follows),
            mentions: self.mentions.unwrap_or(current.mentions),
            reposts: self.reposts.unwrap_or(current.reposts),
        }
    }
}

/// Field-level change to the privacy section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettingsUpdate {
    /// New value for [`PrivacySettings::show_email`], if changing
    pub show_email: Option<bool>,
    /// New value for [`PrivacySettings::show_location`], if changing
    pub show_location: Option<bool>,
    /// New value for [`PrivacySettings::allow_messages`], if changing
    pub allow_messages: Option<bool>,
    /// New value for [`PrivacySettings::allow_mentions`], if changing
    pub allow_mentions: Option<bool>,
}

impl PrivacySettingsUpdate {
    /// `current` with the given fields replaced
    pub fn apply(&self, current: &PrivacySettings) -> PrivacySettings {
        PrivacySettings {
            show_email: self.show_email.unwrap_or(current.show_email),
            show_location: self.show_location.unwrap_or(current.show_location),
            allow_messages: self.allow_messages.unwrap_or(current.allow_messages),
            allow_mentions: self.allow_mentions.unwrap_or(current.allow_mentions),
        }
    }
}

/// Field-level change to the display section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettingsUpdate {
    /// New value for [`DisplaySettings::theme`], if changing
    pub theme: Option<Theme>,
    /// New value for [`DisplaySettings::font_size`], if changing
    pub font_size: Option<FontSize>,
    /// New value for [`DisplaySettings::reduce_motion`], if changing
    pub reduce_motion: Option<bool>,
}

impl DisplaySettingsUpdate {
    /// `current` with the given fields replaced
    pub fn apply(&self, current: &DisplaySettings) -> DisplaySettings {
        DisplaySettings {
            theme: self.theme.unwrap_or(current.theme),
            font_size: self.font_size.unwrap_or(current.font_size),
            reduce_motion: self.reduce_motion.unwrap_or(current.reduce_motion),
        }
    }
}

/// Reads and writes the settings record.
#[derive(Debug, Clone)]
pub struct SettingsService {
    settings: Document,
}

impl SettingsService {
    /// Create the service over a storage handle
    pub fn new(storage: Storage) -> Self {
        Self {
            settings: storage.document(keys::SETTINGS),
        }
    }

    /// The complete settings record. Never fails.
    pub async fn get_settings(&self) -> Settings {
        self.settings.read_or_default().await
    }

    /// Replace the sections present in `patch`.
    pub async fn save_settings(&self, patch: SettingsPatch) -> Result<()> {
        self.write(|_| patch).await
    }

    /// Change individual notification toggles.
    pub async fn update_notification_settings(
        &self,
        update: &NotificationSettingsUpdate,
    ) -> Result<()> {
        self.write(|current| SettingsPatch {
            notifications: Some(update.apply(&current.notifications)),
            ..SettingsPatch::default()
        })
        .await
    }

    /// Change individual privacy toggles.
    pub async fn update_privacy_settings(&self, update: &PrivacySettingsUpdate) -> Result<()> {
        self.write(|current| SettingsPatch {
            privacy: Some(update.apply(&current.privacy)),
            ..SettingsPatch::default()
        })
        .await
    }

    /// Change individual display preferences.
    pub async fn update_display_settings(&self, update: &DisplaySettingsUpdate) -> Result<()> {
        self.write(|current| SettingsPatch {
            display: Some(update.apply(&current.display)),
            ..SettingsPatch::default()
        })
        .await
    }

    /// Change the UI language.
    pub async fn update_language(&self, language: &str) -> Result<()> {
        let language = language.to_string();
        self.write(|_| SettingsPatch {
            language: Some(language),
            ..SettingsPatch::default()
        })
        .await
    }

    /// Build a patch from the current record and store the merged result,
    /// all under the settings lock.
    async fn write<F>(&self, make_patch: F) -> Result<()>
    where
        F: FnOnce(&Settings) -> SettingsPatch,
    {
        self.settings
            .update(|settings: &mut Settings| {
                make_patch(settings).apply_to(settings);
                true
            })
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to save settings"))?;

        tracing::debug!("Settings saved");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
