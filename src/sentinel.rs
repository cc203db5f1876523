//! Out-of-band history reconciliation.
//!
//! The [`HistorySentinel`] handles location changes that never went through
//! the in-app router: native back/forward and address edits. When such a
//! change lands outside the confinement it answers with a
//! [`Correction`]:
//!
//! 1. confinement disabled, or location inside → accept and track it;
//! 2. echo of our own step-back → accept;
//! 3. a valid location is known → replace the stray entry with it;
//! 4. otherwise → the configured [`FallbackStrategy`].
//!
//! Replace corrections overwrite the stray entry instead of pushing a new
//! one, so repeated escape attempts always land on the same location and
//! never grow the history stack.

use crate::config::FallbackStrategy;
use crate::history::{Correction, EventOrigin, HistoryEvent, HistoryListener};
use crate::state::GuardCore;
use crate::{debug_log, error_log, info_log};
use std::cell::RefCell;
use std::rc::Weak;

/// Decides how to answer out-of-band location changes.
///
/// Holds only a weak handle on the guard: once the owning
/// [`GuardController`](crate::GuardController) is gone every event is
/// accepted untouched.
#[derive(Clone)]
pub struct HistorySentinel {
    core: Weak<RefCell<GuardCore>>,
}

impl HistorySentinel {
    pub(crate) fn new(core: Weak<RefCell<GuardCore>>) -> Self {
        Self { core }
    }

    /// Decide the correction for `event`, updating the guard state.
    pub fn reconcile(&self, event: &HistoryEvent) -> Correction {
        let Some(core) = self.core.upgrade() else {
            return Correction::Accept;
        };
        let Ok(mut core) = core.try_borrow_mut() else {
            error_log!(
                "Guard state busy while reconciling '{}'; accepting",
                event.location
            );
            return Correction::Accept;
        };

        let location = &event.location;
        if !core.enabled() || core.matches(location) {
            core.observe(location);
            return Correction::Accept;
        }

        if event.origin == EventOrigin::Correction {
            debug_log!("Accepting step-back echo at '{}'", location);
            return Correction::Accept;
        }

        if let Some(last_valid) = core.last_valid().cloned() {
            info_log!(
                "Out-of-band navigation to '{}' left the confinement; restoring '{}'",
                location,
                last_valid
            );
            core.set_pending(last_valid.clone());
            return Correction::Replace(last_valid);
        }

        match core.fallback().clone() {
            FallbackStrategy::StepBack => {
                info_log!(
                    "Out-of-band navigation to '{}' with no valid location yet; stepping back",
                    location
                );
                Correction::StepBack(1)
            }
            FallbackStrategy::Replace(target) => {
                info_log!(
                    "Out-of-band navigation to '{}' with no valid location yet; replacing with '{}'",
                    location,
                    target
                );
                core.set_pending(target.clone());
                Correction::Replace(target)
            }
        }
    }

    /// Box this sentinel as a host history listener.
    pub fn into_listener(self) -> HistoryListener {
        Box::new(move |event: &HistoryEvent| self.reconcile(event))
    }
}

impl std::fmt::Debug for HistorySentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistorySentinel")
            .field("attached", &(self.core.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::pattern::PatternMatcher;
    use std::rc::Rc;

    fn core(enabled: bool, fallback: FallbackStrategy) -> Rc<RefCell<GuardCore>> {
        Rc::new(RefCell::new(GuardCore::new(
            enabled,
            Rc::new(PatternMatcher::compile("/flow/{id}").unwrap()),
            fallback,
        )))
    }

    #[test]
    fn test_valid_location_is_accepted_and_tracked() {
        let core = core(true, FallbackStrategy::StepBack);
        let sentinel = HistorySentinel::new(Rc::downgrade(&core));

        let correction = sentinel.reconcile(&HistoryEvent::native("/flow/abc"));
        assert_eq!(correction, Correction::Accept);
        assert_eq!(
            core.borrow().last_valid().map(Location::as_str),
            Some("/flow/abc")
        );
    }

    #[test]
    fn test_invalid_location_is_replaced_with_last_valid() {
        let core = core(true, FallbackStrategy::StepBack);
        let sentinel = HistorySentinel::new(Rc::downgrade(&core));
        sentinel.reconcile(&HistoryEvent::native("/flow/abc"));

        for _ in 0..3 {
            assert_eq!(
                sentinel.reconcile(&HistoryEvent::native("/")),
                Correction::Replace("/flow/abc".into())
            );
        }
        assert_eq!(
            core.borrow().snapshot().pending_target,
            Some("/flow/abc".into())
        );
    }

    #[test]
    fn test_fallback_without_valid_location() {
        let core = core(true, FallbackStrategy::StepBack);
        let sentinel = HistorySentinel::new(Rc::downgrade(&core));
        assert_eq!(
            sentinel.reconcile(&HistoryEvent::native("/other")),
            Correction::StepBack(1)
        );
        assert_eq!(
            sentinel.reconcile(&HistoryEvent::correction("/settings")),
            Correction::Accept
        );

        let core = self::core(true, FallbackStrategy::Replace("/flow/start".into()));
        let sentinel = HistorySentinel::new(Rc::downgrade(&core));
        assert_eq!(
            sentinel.reconcile(&HistoryEvent::native("/other")),
            Correction::Replace("/flow/start".into())
        );
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let core = core(false, FallbackStrategy::StepBack);
        let sentinel = HistorySentinel::new(Rc::downgrade(&core));
        sentinel.reconcile(&HistoryEvent::native("/flow/abc"));
        assert_eq!(
            sentinel.reconcile(&HistoryEvent::native("/settings")),
            Correction::Accept
        );
    }

    #[test]
    fn test_detached_sentinel_accepts() {
        let core = core(true, FallbackStrategy::StepBack);
        let sentinel = HistorySentinel::new(Rc::downgrade(&core));
        drop(core);
        assert_eq!(
            sentinel.reconcile(&HistoryEvent::native("/settings")),
            Correction::Accept
        );
    }
}
