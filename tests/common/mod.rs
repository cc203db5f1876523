//! Test utilities for confinement tests
//!
//! Provides fixtures, helpers, and assertion utilities for integration tests.

#![allow(dead_code)]

use nav_confine::*;

/// The pattern used throughout: a scope root plus one required identifier.
pub const FLOW: &str = "/flow/{id}";

/// Route log output to the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a history from `entries`, positioned at `current`.
pub fn history(entries: &[&str], current: usize) -> MemoryHistory {
    MemoryHistory::with_entries(entries.iter().map(|e| Location::from(*e)).collect(), current)
}

/// Mount the `/flow/{id}` confinement on `host`.
pub fn mount_flow(host: &mut MemoryHistory, enabled: bool) -> GuardController {
    init_logging();
    GuardController::mount(&ConfinementConfig::new(FLOW).enabled(enabled), host)
        .expect("flow pattern compiles")
}

/// Mount an arbitrary configuration on `host`.
pub fn mount_with(host: &mut MemoryHistory, config: &ConfinementConfig) -> GuardController {
    init_logging();
    GuardController::mount(config, host).expect("configuration is valid")
}

/// Paths of every entry in `host`, oldest first.
pub fn paths(host: &MemoryHistory) -> Vec<String> {
    host.entries().iter().map(ToString::to_string).collect()
}

/// Assert the visible location of `host`.
pub fn assert_visible(host: &MemoryHistory, expected: &str) {
    assert_eq!(
        host.current_path(),
        expected,
        "visible location mismatch; history is {:?} at {}",
        paths(host),
        host.index()
    );
}
