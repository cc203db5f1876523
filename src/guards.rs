//! Pre-commit transition guards.
//!
//! A host consults every installed [`TransitionGuard`] **before** an in-app
//! navigation commits. The first guard that does not return
//! [`NavigationAction::Continue`] wins and the navigation is dropped; the
//! visible location and the history stack are left untouched.
//!
//! All guard methods are **synchronous**. A guard runs inside the host's
//! navigation turn and must answer before the turn ends.
//!
//! # Execution order
//!
//! Guards run in **priority order** (higher value first). [`TransitionVeto`]
//! uses priority 100 so confinement is decided before application guards.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use nav_confine::{NavigationAction, NavigationRequest, PatternMatcher, TransitionGuard, TransitionVeto};
//!
//! let matcher = Rc::new(PatternMatcher::compile("/flow/{id}").unwrap());
//! let veto = TransitionVeto::new(true, matcher);
//!
//! let leave = NavigationRequest::with_from("/settings", "/flow/abc");
//! assert!(veto.check(&leave).is_deny());
//!
//! let stay = NavigationRequest::with_from("/flow/def", "/flow/abc");
//! assert_eq!(veto.check(&stay), NavigationAction::Continue);
//! ```

use crate::action::{NavigationAction, NavigationRequest};
use crate::pattern::PatternMatcher;
use crate::{dev_log, trace_log};
use chrono::{DateTime, Utc};
use std::fmt;
use std::rc::Rc;

// ============================================================================
// TransitionGuard trait
// ============================================================================

/// Trait for guards that can veto an in-app transition.
pub trait TransitionGuard: 'static {
    /// Decide whether `request` may commit.
    fn check(&self, request: &NavigationRequest) -> NavigationAction;

    /// Guard name for debugging and error messages.
    fn name(&self) -> &'static str {
        "TransitionGuard"
    }

    /// Priority for execution order. Higher runs first. Default is 0.
    fn priority(&self) -> i32 {
        0
    }
}

/// Create a guard from a function or closure.
///
/// ```
/// use nav_confine::{guard_fn, NavigationAction, NavigationRequest, TransitionGuard};
///
/// let readonly = guard_fn(|request: &NavigationRequest| {
///     if request.to.starts_with("/admin") {
///         NavigationAction::deny("admin is read-only")
///     } else {
///         NavigationAction::Continue
///     }
/// });
/// assert!(readonly.check(&NavigationRequest::new("/admin/users")).is_deny());
/// ```
pub const fn guard_fn<F>(f: F) -> FnGuard<F>
where
    F: Fn(&NavigationRequest) -> NavigationAction + 'static,
{
    FnGuard { f }
}

/// Guard created from a function or closure.
pub struct FnGuard<F> {
    f: F,
}

impl<F> TransitionGuard for FnGuard<F>
where
    F: Fn(&NavigationRequest) -> NavigationAction + 'static,
{
    fn check(&self, request: &NavigationRequest) -> NavigationAction {
        (self.f)(request)
    }
}

// ============================================================================
// TransitionVeto
// ============================================================================

/// Blocks any in-app transition that would leave the confinement.
///
/// A transition `from → to` is vetoed exactly when the confinement is
/// enabled, `from` matches the pattern, and `to` does not. Transitions that
/// start outside the confinement (or have no source) are never vetoed, so an
/// application that boots outside the subtree can still navigate into it.
pub struct TransitionVeto {
    enabled: bool,
    matcher: Rc<PatternMatcher>,
}

impl TransitionVeto {
    /// Create a veto over `matcher`. When `enabled` is false every transition passes.
    pub fn new(enabled: bool, matcher: Rc<PatternMatcher>) -> Self {
        Self { enabled, matcher }
    }

    /// The bare decision: `true` when `from → to` must be blocked.
    pub fn blocks(&self, from: &str, to: &str) -> bool {
        self.enabled && self.matcher.matches(from) && !self.matcher.matches(to)
    }
}

impl TransitionGuard for TransitionVeto {
    fn check(&self, request: &NavigationRequest) -> NavigationAction {
        let Some(from) = &request.from else {
            return NavigationAction::Continue;
        };
        if !self.blocks(from, &request.to) {
            trace_log!("Transition '{}' → '{}' allowed", from, request.to);
            return NavigationAction::Continue;
        }

        #[cfg(debug_assertions)]
        {
            let record = BlockedNavigation::new(request.to.as_str(), from.as_str());
            dev_log!("{}", record);
        }

        NavigationAction::deny(format!(
            "'{}' is outside the confinement '{}'",
            request.to,
            self.matcher.pattern()
        ))
    }

    fn name(&self) -> &'static str {
        "TransitionVeto"
    }

    fn priority(&self) -> i32 {
        100
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Diagnostic record for a vetoed transition.
///
/// Only logged in debug builds; it never influences the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedNavigation {
    /// Where the application tried to go.
    pub attempted_path: String,
    /// Where it stays.
    pub current_path: String,
    /// When the attempt was blocked.
    pub timestamp: DateTime<Utc>,
}

impl BlockedNavigation {
    /// Record an attempt blocked now.
    pub fn new(attempted_path: impl Into<String>, current_path: impl Into<String>) -> Self {
        Self {
            attempted_path: attempted_path.into(),
            current_path: current_path.into(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for BlockedNavigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocked navigation attempted_path={} current_path={} timestamp={}",
            self.attempted_path,
            self.current_path,
            self.timestamp.to_rfc3339()
        )
    }
}
