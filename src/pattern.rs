//! Confinement patterns and the matcher compiled from them.
//!
//! A [`ConfinementPattern`] describes which locations are inside the
//! allowed subtree; a [`PatternMatcher`] is its compiled, total form.
//!
//! | Pattern | Syntax | Example |
//! |---------|--------|---------|
//! | [`Route`](ConfinementPattern::Route) | matchit route | `/flow/{id}` |
//! | [`Regex`](ConfinementPattern::Regex) | regular expression, matched against the whole path | `^/flow/[^/]+$` |
//! | [`Subtree`](ConfinementPattern::Subtree) | root plus a required identifier | `/flow` + `{id}` |
//!
//! Only the path portion of a location is matched. Parameters captured by a
//! route pattern must be non-empty, and paths that are not absolute never
//! match.
//!
//! # Example
//!
//! ```
//! use nav_confine::PatternMatcher;
//!
//! let matcher = PatternMatcher::compile("/flow/{id}").unwrap();
//! assert!(matcher.matches("/flow/abc"));
//! assert!(matcher.matches("/flow/abc?step=2"));
//! assert!(!matcher.matches("/flow"));
//! assert!(!matcher.matches("/flow/abc/view"));
//! ```

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, MatchCache};
use crate::error::ConfigError;
use crate::location::path_of;
use crate::trace_log;
use regex::Regex;
#[cfg(feature = "cache")]
use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ConfinementPattern
// ============================================================================

/// Description of the allowed subtree, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfinementPattern {
    /// A matchit route, e.g. `/flow/{id}` or `/flow/{id}/{*rest}`.
    Route(String),

    /// A regular expression that must match the entire path.
    Regex(String),

    /// `root` followed by one required, non-empty identifier segment.
    Subtree {
        /// Absolute subtree root such as `/flow`.
        root: String,
        /// Also admit any deeper path below the identifier.
        include_nested: bool,
    },
}

impl ConfinementPattern {
    /// A matchit route pattern.
    pub fn route(pattern: impl Into<String>) -> Self {
        Self::Route(pattern.into())
    }

    /// A regular expression pattern.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex(pattern.into())
    }

    /// `root/<id>` only, excluding deeper paths and the bare root.
    pub fn subtree(root: impl Into<String>) -> Self {
        Self::Subtree {
            root: root.into(),
            include_nested: false,
        }
    }

    /// `root/<id>` and everything below it.
    pub fn nested_subtree(root: impl Into<String>) -> Self {
        Self::Subtree {
            root: root.into(),
            include_nested: true,
        }
    }
}

/// A bare string is taken as a matchit route.
impl From<&str> for ConfinementPattern {
    fn from(value: &str) -> Self {
        Self::Route(value.to_string())
    }
}

impl From<String> for ConfinementPattern {
    fn from(value: String) -> Self {
        Self::Route(value)
    }
}

/// Parse a pattern string: a leading `^` selects a regular expression,
/// anything else is a matchit route.
impl FromStr for ConfinementPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            Err(ConfigError::EmptyPattern)
        } else if s.starts_with('^') {
            Ok(Self::Regex(s.to_string()))
        } else {
            Ok(Self::Route(s.to_string()))
        }
    }
}

impl fmt::Display for ConfinementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route(route) => write!(f, "{}", route),
            Self::Regex(regex) => write!(f, "{}", regex),
            Self::Subtree {
                root,
                include_nested: false,
            } => write!(f, "{}/{{id}}", root.trim_end_matches('/')),
            Self::Subtree {
                root,
                include_nested: true,
            } => write!(f, "{}/{{id}}/**", root.trim_end_matches('/')),
        }
    }
}

// ============================================================================
// PatternMatcher
// ============================================================================

enum Compiled {
    Route(matchit::Router<()>),
    Regex(Regex),
}

/// Compiled confinement pattern.
///
/// `matches` is pure and total: it never panics and always returns the same
/// verdict for the same input.
pub struct PatternMatcher {
    source: ConfinementPattern,
    compiled: Compiled,
    #[cfg(feature = "cache")]
    cache: RefCell<MatchCache>,
}

impl PatternMatcher {
    /// Compile a pattern.
    pub fn new(pattern: ConfinementPattern) -> Result<Self, ConfigError> {
        let compiled = compile(&pattern)?;
        Ok(Self {
            source: pattern,
            compiled,
            #[cfg(feature = "cache")]
            cache: RefCell::new(MatchCache::new()),
        })
    }

    /// Parse and compile a pattern string (see [`ConfinementPattern::from_str`]).
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        Self::new(pattern.parse()?)
    }

    /// Compile a pattern with a verdict cache of the given capacity.
    #[cfg(feature = "cache")]
    pub fn with_cache_capacity(
        pattern: ConfinementPattern,
        capacity: usize,
    ) -> Result<Self, ConfigError> {
        let cache = MatchCache::with_capacity(capacity)?;
        let compiled = compile(&pattern)?;
        Ok(Self {
            source: pattern,
            compiled,
            cache: RefCell::new(cache),
        })
    }

    /// The pattern this matcher was compiled from.
    pub fn pattern(&self) -> &ConfinementPattern {
        &self.source
    }

    /// Does `location` belong to the allowed subtree?
    pub fn matches(&self, location: &str) -> bool {
        let path = path_of(location);

        #[cfg(feature = "cache")]
        if let Ok(mut cache) = self.cache.try_borrow_mut() {
            if let Some(verdict) = cache.get(path) {
                return verdict;
            }
            let verdict = self.evaluate(path);
            cache.insert(path, verdict);
            return verdict;
        }

        self.evaluate(path)
    }

    /// Verdict cache statistics.
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache
            .try_borrow()
            .map(|cache| cache.stats())
            .unwrap_or_default()
    }

    fn evaluate(&self, path: &str) -> bool {
        if !path.starts_with('/') {
            return false;
        }
        let verdict = match &self.compiled {
            Compiled::Route(router) => router
                .at(path)
                .is_ok_and(|matched| matched.params.iter().all(|(_, value)| !value.is_empty())),
            Compiled::Regex(regex) => regex.is_match(path),
        };
        trace_log!("Pattern '{}' on '{}' → {}", self.source, path, verdict);
        verdict
    }
}

impl fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternMatcher")
            .field("pattern", &self.source)
            .finish_non_exhaustive()
    }
}

fn compile(pattern: &ConfinementPattern) -> Result<Compiled, ConfigError> {
    match pattern {
        ConfinementPattern::Route(route) => compile_routes(route, &[route.trim().to_string()]),
        ConfinementPattern::Regex(source) => {
            let source = source.trim();
            if source.is_empty() {
                return Err(ConfigError::EmptyPattern);
            }
            Regex::new(&format!("^(?:{})$", source))
                .map(Compiled::Regex)
                .map_err(|err| ConfigError::InvalidRegex {
                    pattern: source.to_string(),
                    message: err.to_string(),
                })
        }
        ConfinementPattern::Subtree {
            root,
            include_nested,
        } => {
            let trimmed = root.trim().trim_end_matches('/');
            if !trimmed.starts_with('/') || trimmed.contains(|c: char| c == '{' || c == '}') {
                return Err(ConfigError::InvalidSubtreeRoot { root: root.clone() });
            }
            let mut routes = vec![format!("{}/{{id}}", trimmed)];
            if *include_nested {
                routes.push(format!("{}/{{id}}/{{*rest}}", trimmed));
            }
            compile_routes(root, &routes)
        }
    }
}

fn compile_routes(source: &str, routes: &[String]) -> Result<Compiled, ConfigError> {
    let mut router = matchit::Router::new();
    for route in routes {
        if route.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }
        router
            .insert(route.as_str(), ())
            .map_err(|err| ConfigError::InvalidRoute {
                pattern: source.to_string(),
                message: err.to_string(),
            })?;
    }
    Ok(Compiled::Route(router))
}
