//! # FFI Types
//!
//! C-compatible types for cross-platform FFI.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::error::FfiError;

/// FFI-safe result type
///
/// Used to return results across the FFI boundary.
#[repr(C)]
pub struct FfiResult {
    /// Success flag (1 = success, 0 = error)
    pub success: i32,
    /// Error code (0 if success)
    pub error_code: i32,
    /// Error message (null if success)
    pub error_message: *mut c_char,
    /// Result data (null if error)
    pub data: *mut c_char,
    /// 1 when retrying the same call may succeed
    pub recoverable: i32,
}

impl FfiResult {
    /// Create a successful result with data
    pub fn ok(data: String) -> Self {
        Self {
            success: 1,
            error_code: 0,
            error_message: std::ptr::null_mut(),
            data: into_c_string(data),
            recoverable: 0,
        }
    }

    /// Create a successful result without data
    pub fn ok_empty() -> Self {
        Self {
            success: 1,
            error_code: 0,
            error_message: std::ptr::null_mut(),
            data: std::ptr::null_mut(),
            recoverable: 0,
        }
    }

    /// Create an error result
    pub fn err(code: i32, message: String) -> Self {
        FfiError::from_code(code, message).into()
    }

    /// Create from a dispatcher result
    pub fn from_dispatch(result: super::DResult) -> Self {
        match result {
            Ok(json) => Self::ok(json),
            Err((code, message)) => Self::err(code, message),
        }
    }
}

impl From<FfiError> for FfiResult {
    fn from(e: FfiError) -> Self {
        Self {
            success: 0,
            error_code: e.code,
            error_message: into_c_string(e.message),
            data: std::ptr::null_mut(),
            recoverable: i32::from(e.recoverable),
        }
    }
}

/// Hand a Rust string to C. Interior NULs are stripped rather than failing.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Convert a C string to a Rust String
///
/// # Safety
/// The caller must ensure the pointer is valid and null-terminated.
pub unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(String::from)
}

/// Read an optional argument string
///
/// Null means "no arguments" and yields an empty string; bytes that are not
/// UTF-8 are rejected with code 1.
///
/// # Safety
/// The pointer must be null or valid and null-terminated.
pub(crate) unsafe fn args_from_ptr(ptr: *const c_char) -> Result<String, FfiError> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    cstr_to_string(ptr).ok_or_else(|| FfiError::from_code(1, "Arguments are not valid UTF-8"))
}

/// Free a C string allocated by Rust
///
/// # Safety
/// The pointer must have been allocated by Rust using CString::into_raw().
#[no_mangle]
pub unsafe extern "C" fn gobia_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Free an FfiResult
///
/// # Safety
/// The FfiResult must have been created by Rust FFI functions.
#[no_mangle]
pub unsafe extern "C" fn gobia_free_result(result: FfiResult) {
    if !result.error_message.is_null() {
        drop(CString::from_raw(result.error_message));
    }
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
}
