//! Navigation confinement for GPUI applications.
//!
//! A confinement keeps every reachable location inside one route pattern,
//! typically a single-identifier subtree such as `/flow/{id}`. Once the
//! application has entered the subtree, nothing takes it out again:
//!
//! - **In-app navigation** to a location outside the pattern is vetoed
//!   before it commits ([`TransitionVeto`]).
//! - **Out-of-band navigation** (native back/forward, an edited address)
//!   that lands outside the pattern is corrected after the fact by
//!   replacing the stray entry with the last valid location
//!   ([`HistorySentinel`]).
//! - On every render, [`ConfinementBoundary`] re-checks the visible location
//!   and repairs anything that slipped past both.
//!
//! Movement between two matching locations is always allowed.
//!
//! # Quick start
//!
//! ```
//! use nav_confine::{ConfinementConfig, GuardController, MemoryHistory};
//!
//! let mut host = MemoryHistory::with_entries(vec!["/".into(), "/flow/abc".into()], 1);
//! let controller = GuardController::mount(&ConfinementConfig::new("/flow/{id}"), &mut host).unwrap();
//!
//! // Native back would leave the flow: the entry is replaced instead.
//! host.back();
//! assert_eq!(host.current_path(), "/flow/abc");
//!
//! // In-app navigation out of the flow never commits.
//! assert!(host.navigate("/settings").is_blocked());
//! assert!(host.navigate("/flow/def").is_success());
//! # drop(controller);
//! ```
//!
//! # GPUI
//!
//! ```ignore
//! use nav_confine::{init_confinement, Confinement, ConfinementConfig, MemoryHistory};
//!
//! init_confinement(cx, &ConfinementConfig::new("/flow/{id}"), MemoryHistory::new("/flow/abc"))?;
//! Confinement::navigate(cx, "/flow/def");
//! ```
//!
//! # Features
//!
//! | Feature   | Default | Description                          |
//! |-----------|---------|--------------------------------------|
//! | `log`     | yes     | Log through the `log` crate          |
//! | `tracing` | no      | Log through the `tracing` crate      |
//! | `cache`   | yes     | LRU memo of pattern verdicts (`lru`) |

#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod logging;

mod action;
#[cfg(feature = "cache")]
mod cache;
mod config;
mod context;
mod controller;
mod error;
mod guards;
mod history;
mod location;
mod pattern;
mod sentinel;
mod state;
mod subscription;
mod tracker;
mod widgets;

pub use action::{NavigationAction, NavigationRequest};
#[cfg(feature = "cache")]
pub use cache::{CacheStats, MatchCache};
pub use config::{ConfinementConfig, FallbackStrategy};
pub use context::{init_confinement, reconcile_global, Confinement, GlobalConfinement};
pub use controller::{GuardController, GuardPhase};
pub use error::{ConfigError, NavigationResult};
pub use guards::{guard_fn, BlockedNavigation, FnGuard, TransitionGuard, TransitionVeto};
pub use history::{
    CommitObserver, Correction, EventOrigin, HistoryEvent, HistoryHost, HistoryListener,
    MemoryHistory, NavigationHost, MAX_CORRECTION_DEPTH,
};
pub use location::Location;
pub use pattern::{ConfinementPattern, PatternMatcher};
pub use sentinel::HistorySentinel;
pub use state::GuardState;
pub use subscription::{SubscriberSet, Subscription};
pub use tracker::LastValidLocationTracker;
pub use widgets::{confinement_boundary, ConfinementBoundary};
