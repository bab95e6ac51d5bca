//! # Gobia Core
//!
//! Local persistence for the Gobia mobile client: login state, the user's
//! profile and settings, joined communities, bookmarks and drafts.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         GOBIA CORE MODULES                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐   │
//! │  │  Identity   │  │  Settings   │  │  Community  │  │  Bookmarks   │   │
//! │  │             │  │             │  │             │  │  / Drafts    │   │
//! │  │ - Login     │  │ - Notif.    │  │ - Join      │  │ - Save       │   │
//! │  │ - Token     │  │ - Privacy   │  │ - Leave     │  │ - Upsert     │   │
//! │  │ - Profile   │  │ - Display   │  │ - List      │  │ - Remove     │   │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘  └──────┬───────┘   │
//! │         │                │                │                │           │
//! │         └────────────────┴────────────────┴────────────────┘           │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Storage: Document per key ──► KeyValueStore (SQLite / memory)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`storage`] - Key-value backends and typed JSON documents
//! - [`identity`] - Login state and the user profile
//! - [`settings`] - User preferences with defaults
//! - [`community`] - Joined communities
//! - [`bookmarks`] - Saved posts and comments
//! - [`drafts`] - Unpublished posts and threads
//! - [`ffi`] - JSON method dispatcher and C bindings for the host app
//!
//! ## Failure Policy
//!
//! Reads never fail: a missing or unreadable value comes back as the
//! empty or default value, with a warning logged. Writes return
//! [`Error`] so the host can tell the user.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod bookmarks;
pub mod community;
pub mod drafts;
pub mod error;
pub mod ffi;
pub mod identity;
pub mod logging;
pub mod settings;
pub mod storage;
/// Clock helpers for stamps and ids.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use bookmarks::{BookmarkService, BookmarkedComment, BookmarkedPost, Comment, Count, Post};
pub use community::MembershipService;
pub use drafts::{Draft, DraftService, MediaAttachment, MediaKind, ThreadPost};
pub use error::{Error, Result};
pub use identity::{AuthRecord, AuthService, Profile, ProfileService, UserData};
pub use settings::{Settings, SettingsPatch, SettingsService};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, Storage, StorageConfig};

// ============================================================================
// CORE INSTANCE
// ============================================================================

use serde::Deserialize;
use std::sync::Arc;

/// Configuration for opening Gobia Core
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    /// SQLite database file; in-memory storage if None
    pub storage_path: Option<String>,
    /// Enable verbose logging
    pub verbose_logging: bool,
}

/// Entry point owning the storage handle shared by every service.
///
/// Services are cheap views over the shared [`Storage`]; create them on
/// demand.
#[derive(Debug, Clone)]
pub struct GobiaCore {
    storage: Storage,
    config: CoreConfig,
}

impl GobiaCore {
    /// Open storage as configured.
    pub async fn open(config: CoreConfig) -> Result<Self> {
        tracing::info!("Opening Gobia Core v{}", env!("CARGO_PKG_VERSION"));

        let storage = storage::open(&StorageConfig {
            database_path: config.storage_path.clone(),
        })
        .await?;

        Ok(Self { storage, config })
    }

    /// Run over an existing backend
    pub fn with_store(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage: Storage::new(kv),
            config: CoreConfig::default(),
        }
    }

    /// Run over fresh in-memory storage
    pub fn in_memory() -> Self {
        Self {
            storage: Storage::in_memory(),
            config: CoreConfig::default(),
        }
    }

    /// The configuration this instance was opened with
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// The shared storage handle
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Service for the login flag, user and token
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.storage.clone())
    }

    /// Service for the user's editable profile
    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.storage.clone())
    }

    /// Service for app settings
    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.storage.clone())
    }

    /// Service for community membership
    pub fn communities(&self) -> MembershipService {
        MembershipService::new(self.storage.clone())
    }

    /// Service for bookmarked posts and comments
    pub fn bookmarks(&self) -> BookmarkService {
        BookmarkService::new(self.storage.clone())
    }

    /// Service for unpublished drafts
    pub fn drafts(&self) -> DraftService {
        DraftService::new(self.storage.clone())
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Gobia Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns build information for debugging
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        #[cfg(target_os = "ios")]
        target: "ios",
        #[cfg(target_os = "android")]
        target: "android",
        #[cfg(target_os = "macos")]
        target: "macos",
        #[cfg(target_os = "linux")]
        target: "linux",
        #[cfg(target_os = "windows")]
        target: "windows",
        #[cfg(not(any(
            target_os = "ios",
            target_os = "android",
            target_os = "macos",
            target_os = "linux",
            target_os = "windows"
        )))]
        target: "unknown",
        profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
    }
}

/// Build information for debugging
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Crate version
    pub version: &'static str,
    /// Target OS
    pub target: &'static str,
    /// Build profile (debug/release)
    pub profile: &'static str,
}

// ============================================================================
// TESTS
// ============================================================================
