//! Error and outcome types.
//!
//! - [`ConfigError`]: returned when a confinement cannot be built from its
//!   configuration. Nothing is installed on the host when this happens.
//! - [`NavigationResult`]: the outcome of a navigation attempt made
//!   through a host such as [`MemoryHistory`](crate::MemoryHistory).
//!
//! # Examples
//!
//! ```
//! use nav_confine::{ConfigError, NavigationResult};
//!
//! let result = NavigationResult::Blocked { reason: "leaves /flow".into() };
//! assert!(result.is_blocked());
//!
//! let err = ConfigError::EmptyPattern;
//! assert_eq!(err.to_string(), "Confinement pattern is empty");
//! ```

use std::fmt;

// ============================================================================
// Configuration errors
// ============================================================================

/// The confinement could not be configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The pattern string was empty (or only whitespace).
    EmptyPattern,

    /// The route pattern was rejected by the route compiler.
    InvalidRoute { pattern: String, message: String },

    /// The regular expression failed to compile.
    InvalidRegex { pattern: String, message: String },

    /// A subtree root must be an absolute path with at least one segment.
    InvalidSubtreeRoot { root: String },

    /// A fixed fallback location must itself be inside the confinement.
    FallbackOutsidePattern { location: String },

    /// The verdict cache needs room for at least one entry.
    InvalidCacheCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPattern => write!(f, "Confinement pattern is empty"),
            ConfigError::InvalidRoute { pattern, message } => {
                write!(f, "Invalid route pattern '{}': {}", pattern, message)
            }
            ConfigError::InvalidRegex { pattern, message } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, message)
            }
            ConfigError::InvalidSubtreeRoot { root } => {
                write!(f, "Invalid subtree root '{}': expected '/segment'", root)
            }
            ConfigError::FallbackOutsidePattern { location } => {
                write!(
                    f,
                    "Fallback location '{}' does not match the confinement pattern",
                    location
                )
            }
            ConfigError::InvalidCacheCapacity => {
                write!(f, "Verdict cache capacity must be non-zero")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Navigation outcome
// ============================================================================

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    /// The navigation committed; `path` is now the visible location.
    Success { path: String },
    /// A pre-commit guard vetoed the navigation; nothing changed.
    Blocked { reason: String },
    /// There was no history entry to move to.
    Unchanged,
}

impl NavigationResult {
    /// Check if navigation was successful
    pub fn is_success(&self) -> bool {
        matches!(self, NavigationResult::Success { .. })
    }

    /// Check if navigation was blocked
    pub fn is_blocked(&self) -> bool {
        matches!(self, NavigationResult::Blocked { .. })
    }

    /// Path committed by a successful navigation.
    pub fn path(&self) -> Option<&str> {
        match self {
            NavigationResult::Success { path } => Some(path),
            _ => None,
        }
    }
}
