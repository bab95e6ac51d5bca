//! # C API
//!
//! C-compatible FFI functions for iOS, Android and other native hosts.
//!
//! All functions follow the naming convention: `gobia_<action>`. Every
//! service method goes through [`gobia_call`]; see the dispatcher for the
//! method table.

use std::os::raw::c_char;

use super::dispatcher::dispatch;
use super::state::{get_core, get_runtime, init_core};
use super::types::*;
use crate::error::{Error, FfiError};
use crate::{CoreConfig, GobiaCore};

fn error_result(e: Error) -> FfiResult {
    FfiError::from(e).into()
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize Gobia Core
///
/// Must be called before [`gobia_call`].
///
/// # Arguments
/// * `config_json` - `{ "storagePath"?: "...", "verboseLogging"?: bool }`,
///   or null for in-memory storage with default logging
///
/// # Safety
/// `config_json` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn gobia_init(config_json: *const c_char) -> FfiResult {
    let config: CoreConfig = match cstr_to_string(config_json) {
        Some(json) if !json.trim().is_empty() => match serde_json::from_str(&json) {
            Ok(config) => config,
            Err(e) => return error_result(Error::DeserializationError(e.to_string())),
        },
        Some(_) => CoreConfig::default(),
        None if config_json.is_null() => CoreConfig::default(),
        None => return FfiResult::err(1, "Config is not valid UTF-8".to_string()),
    };

    crate::logging::init(config.verbose_logging);

    let rt = match get_runtime() {
        Ok(rt) => rt,
        Err(e) => return error_result(e),
    };

    match rt.block_on(GobiaCore::open(config)).and_then(init_core) {
        Ok(()) => {
            tracing::info!("Gobia FFI initialized");
            FfiResult::ok_empty()
        }
        Err(e) => {
            tracing::error!(error = %e, "Gobia FFI initialization failed");
            error_result(e)
        }
    }
}

/// Get Gobia Core version
///
/// The returned string must be released with `gobia_free_string`.
#[no_mangle]
pub extern "C" fn gobia_version() -> *mut c_char {
    into_c_string(crate::version().to_string())
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Call a service method by name with JSON arguments
///
/// # Arguments
/// * `method` - Method name, e.g. `bookmarks_save_post`
/// * `args` - JSON arguments (null or empty for none)
///
/// # Returns
/// FfiResult whose `data` is the JSON result
///
/// # Safety
/// `method` must be a valid null-terminated string; `args` must be null or
/// a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn gobia_call(method: *const c_char, args: *const c_char) -> FfiResult {
    let method = match cstr_to_string(method) {
        Some(m) => m,
        None => return FfiResult::err(1, "Invalid method name".to_string()),
    };
    let args = match args_from_ptr(args) {
        Ok(args) => args,
        Err(e) => return e.into(),
    };

    let core = match get_core() {
        Ok(core) => core,
        Err(e) => return error_result(e),
    };
    let rt = match get_runtime() {
        Ok(rt) => rt,
        Err(e) => return error_result(e),
    };

    FfiResult::from_dispatch(rt.block_on(dispatch(core, &method, &args)))
}
