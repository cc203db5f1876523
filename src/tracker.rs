//! Last valid location tracking.

use crate::location::Location;
use crate::pattern::PatternMatcher;
use crate::trace_log;

/// Remembers the most recent location that satisfied the confinement pattern.
///
/// The tracked value is only ever replaced, never cleared: once a valid
/// location has been seen it stays available as a correction target until
/// the tracker is dropped.
#[derive(Debug, Clone, Default)]
pub struct LastValidLocationTracker {
    last_valid: Option<Location>,
}

impl LastValidLocationTracker {
    /// Create a tracker that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `location` if it matches. Returns `true` when the tracked value changed.
    pub fn observe(&mut self, matcher: &PatternMatcher, location: &Location) -> bool {
        if !matcher.matches(location) {
            return false;
        }
        if self.last_valid.as_ref() == Some(location) {
            return false;
        }
        trace_log!("Last valid location is now '{}'", location);
        self.last_valid = Some(location.clone());
        true
    }

    /// The latest valid location, or `None` if none has been observed.
    pub fn current(&self) -> Option<&Location> {
        self.last_valid.as_ref()
    }
}
