//! Composition root of a confinement.
//!
//! [`GuardController::mount`] wires a [`PatternMatcher`], the
//! [`LastValidLocationTracker`](crate::LastValidLocationTracker), a
//! [`TransitionVeto`] and a [`HistorySentinel`] around one host. Every
//! registration is held as a [`Subscription`], so dropping the controller
//! (or calling [`unmount`](GuardController::unmount)) detaches it
//! completely.
//!
//! # Example
//!
//! ```
//! use nav_confine::{ConfinementConfig, GuardController, GuardPhase, MemoryHistory};
//!
//! let mut host = MemoryHistory::new("/flow/abc");
//! let controller = GuardController::mount(&ConfinementConfig::new("/flow/{id}"), &mut host).unwrap();
//!
//! assert!(host.navigate("/settings").is_blocked());
//! assert_eq!(controller.phase(host.current_path()), GuardPhase::ConfinedValid);
//! ```

use crate::config::ConfinementConfig;
use crate::error::ConfigError;
use crate::guards::TransitionVeto;
use crate::history::{Correction, HistoryHost, NavigationHost};
use crate::location::Location;
use crate::sentinel::HistorySentinel;
use crate::state::{GuardCore, GuardState};
use crate::subscription::Subscription;
use crate::{debug_log, info_log, warn_log};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Where the visible location stands relative to a confinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    /// Confinement is off; every transition passes.
    Free,
    /// Inside the confinement; leaving transitions are vetoed.
    ConfinedValid,
    /// Outside the confinement. Transient: the sentinel or the render-time
    /// reconcile moves the host back to `ConfinedValid`.
    ConfinedInvalid,
    /// The host has no history capability; nothing is enforced.
    Unavailable,
}

/// Owns every piece of a mounted confinement.
pub struct GuardController {
    core: Rc<RefCell<GuardCore>>,
    available: bool,
    subscriptions: Vec<Subscription>,
}

impl GuardController {
    /// Mount a confinement on `host`.
    ///
    /// The pattern is compiled first; on error nothing is installed.
    pub fn mount(
        config: &ConfinementConfig,
        host: &mut dyn NavigationHost,
    ) -> Result<Self, ConfigError> {
        let matcher = Rc::new(config.build_matcher()?);
        let core = Rc::new(RefCell::new(GuardCore::new(
            config.is_enabled(),
            matcher.clone(),
            config.fallback_strategy().clone(),
        )));

        let initial = host.current_location();
        core.borrow_mut().observe(&initial);

        let Some(history) = host.history() else {
            warn_log!(
                "Host has no history capability; confinement '{}' will not be enforced",
                matcher.pattern()
            );
            return Ok(Self {
                core,
                available: false,
                subscriptions: Vec::new(),
            });
        };

        let sentinel = HistorySentinel::new(Rc::downgrade(&core));
        let mut subscriptions = vec![history.subscribe(sentinel.into_listener())];

        subscriptions.push(host.install_guard(Rc::new(TransitionVeto::new(
            config.is_enabled(),
            matcher.clone(),
        ))));

        let weak: Weak<RefCell<GuardCore>> = Rc::downgrade(&core);
        subscriptions.push(host.observe_commits(Box::new(move |location: &Location| {
            if let Some(core) = weak.upgrade() {
                if let Ok(mut core) = core.try_borrow_mut() {
                    core.observe(location);
                }
            }
        })));

        info_log!(
            "Confinement '{}' mounted at '{}' (enabled: {})",
            matcher.pattern(),
            initial,
            config.is_enabled()
        );

        Ok(Self {
            core,
            available: true,
            subscriptions,
        })
    }

    /// Classify `current` against the confinement.
    pub fn phase(&self, current: &str) -> GuardPhase {
        if !self.available {
            return GuardPhase::Unavailable;
        }
        let core = self.core.borrow();
        if !core.enabled() {
            GuardPhase::Free
        } else if core.matches(current) {
            GuardPhase::ConfinedValid
        } else {
            GuardPhase::ConfinedInvalid
        }
    }

    /// Snapshot of the guard state.
    pub fn state(&self) -> GuardState {
        self.core.borrow().snapshot()
    }

    /// The most recent location that matched the pattern.
    pub fn last_valid_location(&self) -> Option<Location> {
        self.core.borrow().last_valid().cloned()
    }

    /// Whether confinement was enabled at mount.
    pub fn is_enabled(&self) -> bool {
        self.core.borrow().enabled()
    }

    /// `false` when mounted on a host without history.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// A sentinel bound to this controller, for hosts that dispatch
    /// history events themselves.
    pub fn sentinel(&self) -> HistorySentinel {
        HistorySentinel::new(Rc::downgrade(&self.core))
    }

    /// Send the visible location back inside the confinement if something
    /// slipped past the veto and the sentinel.
    ///
    /// Applies and returns the correction; [`Correction::Accept`] when
    /// nothing had to change.
    pub fn reconcile(&self, history: &mut dyn HistoryHost) -> Correction {
        if !self.available {
            return Correction::Accept;
        }
        let current = history.current_location();
        let target = {
            let Ok(mut core) = self.core.try_borrow_mut() else {
                return Correction::Accept;
            };
            if !core.enabled() || core.matches(&current) {
                return Correction::Accept;
            }
            let Some(target) = core.correction_target() else {
                return Correction::Accept;
            };
            if target == current {
                return Correction::Accept;
            }
            core.set_pending(target.clone());
            target
        };

        warn_log!("Location '{}' escaped the confinement; restoring '{}'", current, target);
        let correction = Correction::Replace(target);
        history.apply(&correction);
        correction
    }

    /// Release every host registration.
    pub fn unmount(self) {
        debug_log!(
            "Unmounting confinement ({} subscriptions)",
            self.subscriptions.len()
        );
        drop(self);
    }
}

impl std::fmt::Debug for GuardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardController")
            .field("state", &self.state())
            .field("available", &self.available)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
