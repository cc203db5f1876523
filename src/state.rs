//! Guard state shared by the veto, the sentinel and the commit observer.

use crate::config::FallbackStrategy;
use crate::location::Location;
use crate::pattern::PatternMatcher;
use crate::trace_log;
use crate::tracker::LastValidLocationTracker;
use std::rc::Rc;

/// Snapshot of a mounted guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardState {
    /// Fixed at mount time.
    pub enabled: bool,
    /// Most recent location that matched the pattern.
    pub last_valid_location: Option<Location>,
    /// Target of a replace correction the host has not yet committed.
    pub pending_target: Option<Location>,
}

/// Mutable core behind a [`GuardController`](crate::GuardController).
///
/// Lives in an `Rc<RefCell<_>>`; every host callback borrows it for the
/// duration of one decision and releases it before the host acts.
pub(crate) struct GuardCore {
    enabled: bool,
    matcher: Rc<PatternMatcher>,
    fallback: FallbackStrategy,
    tracker: LastValidLocationTracker,
    pending_target: Option<Location>,
}

impl GuardCore {
    pub(crate) fn new(
        enabled: bool,
        matcher: Rc<PatternMatcher>,
        fallback: FallbackStrategy,
    ) -> Self {
        Self {
            enabled,
            matcher,
            fallback,
            tracker: LastValidLocationTracker::new(),
            pending_target: None,
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn matches(&self, location: &str) -> bool {
        self.matcher.matches(location)
    }

    pub(crate) fn fallback(&self) -> &FallbackStrategy {
        &self.fallback
    }

    pub(crate) fn last_valid(&self) -> Option<&Location> {
        self.tracker.current()
    }

    /// Feed an accepted location to the tracker.
    ///
    /// Any valid location settles a pending correction: once the host is
    /// back inside, the newest valid location is the only correction target.
    pub(crate) fn observe(&mut self, location: &Location) {
        if !self.matcher.matches(location) {
            return;
        }
        self.tracker.observe(&self.matcher, location);
        if let Some(pending) = self.pending_target.take() {
            trace_log!("Pending correction to '{}' settled at '{}'", pending, location);
        }
    }

    pub(crate) fn set_pending(&mut self, target: Location) {
        self.pending_target = Some(target);
    }

    /// Where a stray location should be sent back to, if anywhere.
    pub(crate) fn correction_target(&self) -> Option<Location> {
        self.pending_target
            .clone()
            .or_else(|| self.tracker.current().cloned())
    }

    pub(crate) fn snapshot(&self) -> GuardState {
        GuardState {
            enabled: self.enabled,
            last_valid_location: self.tracker.current().cloned(),
            pending_target: self.pending_target.clone(),
        }
    }
}
