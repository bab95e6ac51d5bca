//! Tracing subscriber setup for hosts that do not install their own.

/// Filter used when `RUST_LOG` is unset and verbose logging is on
pub const VERBOSE_FILTER: &str = "info,gobia_core=debug";

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn,gobia_core=info";

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`VERBOSE_FILTER`] or [`DEFAULT_FILTER`].
///
/// Returns false if a global subscriber was already set.
pub fn init(verbose: bool) -> bool {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .try_init()
        .is_ok()
}
