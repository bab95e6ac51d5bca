//! # Database Schema
//!
//! SQL schema for the SQLite key-value backend.
//!
//! ```text
//! ┌─────────────────┐      ┌─────────────────┐
//! │ schema_version  │      │    kv_store     │
//! ├─────────────────┤      ├─────────────────┤
//! │ version         │      │ key             │
//! └─────────────────┘      │ value           │
//!                          │ updated_at      │
//!                          └─────────────────┘
//! ```

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- One row per storage key
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    -- JSON document or raw string, opaque to the backend
    value TEXT NOT NULL,
    -- Last write, Unix milliseconds
    updated_at INTEGER NOT NULL
);
"#;
