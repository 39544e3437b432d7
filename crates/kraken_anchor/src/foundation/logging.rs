//! Logging utilities
//!
//! Anchor logs through the `log` facade. Binaries call [`init`] or
//! [`init_with_level`] once at startup; `RUST_LOG` overrides the level.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`, defaulting to `info`
pub fn init() {
    init_with_level("info");
}

/// Initialize the logging system with a default filter such as `"debug"`
///
/// Calling this more than once is harmless; only the first call installs a
/// logger.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
