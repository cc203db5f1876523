//! Confinement configuration.
//!
//! [`ConfinementConfig`] is built once and handed to the
//! [`GuardController`](crate::GuardController); nothing in it can change
//! while the controller is mounted.
//!
//! ```
//! use nav_confine::{ConfinementConfig, ConfinementPattern, FallbackStrategy};
//!
//! let config = ConfinementConfig::new(ConfinementPattern::subtree("/flow"))
//!     .enabled(true)
//!     .fallback(FallbackStrategy::StepBack);
//! assert!(config.is_enabled());
//! ```

use crate::error::ConfigError;
use crate::location::Location;
use crate::pattern::{ConfinementPattern, PatternMatcher};

/// What to do when an out-of-band navigation leaves the confinement and no
/// valid location has been observed yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FallbackStrategy {
    /// Step back exactly one history entry.
    #[default]
    StepBack,
    /// Replace the current entry with a fixed location inside the confinement.
    Replace(Location),
}

/// Immutable confinement settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfinementConfig {
    pattern: ConfinementPattern,
    enabled: bool,
    fallback: FallbackStrategy,
    #[cfg(feature = "cache")]
    cache_capacity: usize,
}

impl ConfinementConfig {
    /// Confine to `pattern`. Enabled by default.
    pub fn new(pattern: impl Into<ConfinementPattern>) -> Self {
        Self {
            pattern: pattern.into(),
            enabled: true,
            fallback: FallbackStrategy::default(),
            #[cfg(feature = "cache")]
            cache_capacity: crate::cache::MatchCache::DEFAULT_CAPACITY,
        }
    }

    /// Parse `pattern` (see [`ConfinementPattern::from_str`](std::str::FromStr)).
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(pattern.parse::<ConfinementPattern>()?))
    }

    /// Turn confinement on or off for the controller's whole lifetime.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Choose the fallback used before any valid location is known.
    pub fn fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of pattern verdicts to memoize.
    #[cfg(feature = "cache")]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Whether confinement is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The configured pattern.
    pub fn pattern(&self) -> &ConfinementPattern {
        &self.pattern
    }

    /// The configured fallback.
    pub fn fallback_strategy(&self) -> &FallbackStrategy {
        &self.fallback
    }

    /// Compile the pattern and check the fallback against it.
    pub fn build_matcher(&self) -> Result<PatternMatcher, ConfigError> {
        #[cfg(feature = "cache")]
        let matcher = PatternMatcher::with_cache_capacity(self.pattern.clone(), self.cache_capacity)?;
        #[cfg(not(feature = "cache"))]
        let matcher = PatternMatcher::new(self.pattern.clone())?;

        if let FallbackStrategy::Replace(location) = &self.fallback {
            if !matcher.matches(location) {
                return Err(ConfigError::FallbackOutsidePattern {
                    location: location.to_string(),
                });
            }
        }
        Ok(matcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfinementConfig::new("/flow/{id}");
        assert!(config.is_enabled());
        assert_eq!(config.fallback_strategy(), &FallbackStrategy::StepBack);
        assert_eq!(config.pattern(), &ConfinementPattern::route("/flow/{id}"));
    }

    #[test]
    fn test_parse_regex() {
        let config = ConfinementConfig::parse("^/flow/[^/]+$").unwrap().enabled(false);
        assert!(!config.is_enabled());
        assert!(matches!(config.pattern(), ConfinementPattern::Regex(_)));
        assert_eq!(ConfinementConfig::parse(""), Err(ConfigError::EmptyPattern));
    }

    #[test]
    fn test_fallback_must_be_inside() {
        let config = ConfinementConfig::new("/flow/{id}")
            .fallback(FallbackStrategy::Replace("/home".into()));
        assert_eq!(
            config.build_matcher().unwrap_err(),
            ConfigError::FallbackOutsidePattern {
                location: "/home".into()
            }
        );

        let config = ConfinementConfig::new("/flow/{id}")
            .fallback(FallbackStrategy::Replace("/flow/start".into()));
        assert!(config.build_matcher().is_ok());
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_zero_cache_capacity_rejected() {
        let config = ConfinementConfig::new("/flow/{id}").cache_capacity(0);
        assert_eq!(
            config.build_matcher().unwrap_err(),
            ConfigError::InvalidCacheCapacity
        );
    }
}
