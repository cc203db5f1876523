//! Navigation requests and the verdicts returned for them.
//!
//! A host builds a [`NavigationRequest`] for every in-app navigation and
//! asks each installed [`TransitionGuard`](crate::TransitionGuard) for a
//! [`NavigationAction`] before committing.

use crate::location::Location;

// ============================================================================
// NavigationRequest
// ============================================================================

/// A proposed in-app transition.
///
/// # Example
///
/// ```
/// use nav_confine::NavigationRequest;
///
/// let request = NavigationRequest::with_from("/settings", "/flow/abc");
/// assert_eq!(request.to, "/settings");
/// assert_eq!(request.from.as_ref().map(|l| l.as_str()), Some("/flow/abc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// The location we're navigating from (if any)
    pub from: Option<Location>,

    /// The location we're navigating to
    pub to: Location,
}

impl NavigationRequest {
    /// Create a request with no known source.
    pub fn new(to: impl Into<Location>) -> Self {
        Self {
            from: None,
            to: to.into(),
        }
    }

    /// Create a request with a source location.
    pub fn with_from(to: impl Into<Location>, from: impl Into<Location>) -> Self {
        Self {
            from: Some(from.into()),
            to: to.into(),
        }
    }
}

// ============================================================================
// NavigationAction
// ============================================================================

/// Verdict of a pre-commit guard.
///
/// # Example
///
/// ```
/// use nav_confine::NavigationAction;
///
/// let action = NavigationAction::deny("leaves the flow");
/// assert!(action.is_deny());
/// assert!(NavigationAction::Continue.is_continue());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Allow navigation to proceed.
    Continue,

    /// Block navigation; the visible location does not change.
    Deny {
        /// Human-readable reason for denying navigation.
        reason: String,
    },
}

impl NavigationAction {
    /// Alias for [`Continue`](Self::Continue).
    pub fn allow() -> Self {
        Self::Continue
    }

    /// Block with a reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    /// Check if this action allows navigation to continue.
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if this action denies navigation.
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }
}
