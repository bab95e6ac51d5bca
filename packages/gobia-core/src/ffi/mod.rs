//! # FFI Bindings
//!
//! Bridge between the host app and the Rust services.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         FFI ARCHITECTURE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  React Native / Swift / Kotlin                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  C API (feature "ffi")                                          │   │
//! │  │                                                                 │   │
//! │  │  gobia_init(config) ──► global runtime + GobiaCore             │   │
//! │  │  gobia_call(method, args) ──► dispatch() ──► JSON result       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Gobia Core                                 │   │
//! │  │                                                                 │   │
//! │  │  Auth │ Profile │ Settings │ Communities │ Bookmarks │ Drafts  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! [`dispatch`] returns `Err((code, message))`; the C API carries the same
//! pair in an `FfiResult`.

mod dispatcher;

mod dispatch_bookmarks;
mod dispatch_community;
mod dispatch_drafts;
mod dispatch_identity;
mod dispatch_settings;

#[cfg(feature = "ffi")]
mod types;

#[cfg(feature = "ffi")]
mod state;

#[cfg(feature = "ffi")]
mod c_api;

pub use dispatcher::{dispatch, DResult};

#[cfg(feature = "ffi")]
pub use types::*;

#[cfg(feature = "ffi")]
pub use c_api::*;
