//! Ambient logging setup, shared by every binary/adapter in the workspace.
//!
//! This mirrors the `log` + `env_logger` pairing used throughout the wider
//! pack (see e.g. `hegel-core`, `mzpeak`): library code only emits through
//! the `log` facade, and a single call to [`init`] wires up a destination
//! for whichever binary links this crate.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the global logger exactly once. Safe to call multiple times
/// (e.g. once per test) and from multiple threads.
pub fn init() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .init();
    });
}
