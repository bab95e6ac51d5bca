//! # Shared FFI State
//!
//! Global runtime and core instance shared by the C entry points.

use once_cell::sync::OnceCell;
use tokio::runtime::Runtime;

use crate::error::{Error, Result};
use crate::GobiaCore;

/// Global async runtime for FFI calls
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Global core, set once by `gobia_init`
static CORE: OnceCell<GobiaCore> = OnceCell::new();

pub(crate) fn get_runtime() -> Result<&'static Runtime> {
    RUNTIME.get_or_try_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("gobia-core")
            .enable_time()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create Tokio runtime: {}", e)))
    })
}

pub(crate) fn get_core() -> Result<&'static GobiaCore> {
    CORE.get().ok_or(Error::NotInitialized)
}

pub(crate) fn init_core(core: GobiaCore) -> Result<()> {
    CORE.set(core).map_err(|_| Error::AlreadyInitialized)
}
