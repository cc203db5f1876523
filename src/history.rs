//! Host navigation capabilities and an in-memory host.
//!
//! A confinement talks to its host through two traits:
//!
//! - [`NavigationHost`]: the in-app router. It runs installed
//!   [`TransitionGuard`]s before committing a navigation and reports every
//!   committed location to commit observers.
//! - [`HistoryHost`]: the navigation history stack. It notifies listeners
//!   of **out-of-band** location changes (native back/forward, address bar)
//!   and applies the [`Correction`] each listener returns.
//!
//! [`MemoryHistory`] implements both over an in-memory stack. It is the
//! host used by the gpui integration and by headless embeddings.
//!
//! # Event ordering
//!
//! Listeners never mutate the host directly. They return a `Correction`,
//! and the host applies it after the listener returns. A step-back
//! correction produces a follow-up event tagged
//! [`EventOrigin::Correction`], which is queued and dispatched after the
//! current one, never re-entrantly. A step-back issued outside any dispatch
//! is delivered immediately.

use crate::action::{NavigationAction, NavigationRequest};
use crate::error::NavigationResult;
use crate::guards::TransitionGuard;
use crate::location::Location;
use crate::subscription::{SubscriberSet, Subscription};
use crate::{debug_log, error_log, info_log, trace_log, warn_log};
use std::collections::VecDeque;
use std::rc::Rc;

/// Maximum number of chained corrections handled for one native event.
pub const MAX_CORRECTION_DEPTH: usize = 5;

// ============================================================================
// Events and corrections
// ============================================================================

/// Who caused an out-of-band location change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// The user or the platform (back/forward buttons, address bar).
    Native,
    /// A step-back issued as a correction by a history listener.
    Correction,
}

/// Out-of-band location change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEvent {
    /// The location now visible.
    pub location: Location,
    /// What caused the change.
    pub origin: EventOrigin,
}

impl HistoryEvent {
    /// A native change to `location`.
    pub fn native(location: impl Into<Location>) -> Self {
        Self {
            location: location.into(),
            origin: EventOrigin::Native,
        }
    }

    /// The echo of a step-back correction.
    pub fn correction(location: impl Into<Location>) -> Self {
        Self {
            location: location.into(),
            origin: EventOrigin::Correction,
        }
    }
}

/// What a history listener wants done after an out-of-band change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    /// Leave the location as it is.
    Accept,
    /// Overwrite the current history entry.
    Replace(Location),
    /// Step back this many entries.
    StepBack(usize),
}

impl Correction {
    /// `true` for [`Correction::Accept`].
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Callback for out-of-band location changes.
pub type HistoryListener = Box<dyn FnMut(&HistoryEvent) -> Correction>;

/// Callback for committed locations.
pub type CommitObserver = Box<dyn FnMut(&Location)>;

// ============================================================================
// Host traits
// ============================================================================

/// The navigation history stack of a host.
pub trait HistoryHost {
    /// The visible location.
    fn current_location(&self) -> Location;

    /// Listen for out-of-band location changes.
    fn subscribe(&mut self, listener: HistoryListener) -> Subscription;

    /// Append an entry without notifying history listeners.
    fn push(&mut self, location: Location);

    /// Overwrite the current entry without notifying history listeners.
    fn replace(&mut self, location: Location);

    /// Step back `steps` entries. Returns `false` if the stack is too short,
    /// in which case nothing changes.
    fn go_back(&mut self, steps: usize) -> bool;

    /// Apply a listener's correction.
    fn apply(&mut self, correction: &Correction) {
        match correction {
            Correction::Accept => {}
            Correction::Replace(location) => self.replace(location.clone()),
            Correction::StepBack(steps) => {
                if !self.go_back(*steps) {
                    warn_log!("Cannot step back {} entries; history too short", steps);
                }
            }
        }
    }
}

/// The in-app router of a host.
pub trait NavigationHost {
    /// The visible location.
    fn current_location(&self) -> Location;

    /// Consult `guard` before every in-app navigation commits.
    fn install_guard(&mut self, guard: Rc<dyn TransitionGuard>) -> Subscription;

    /// Be told about every location the host commits.
    fn observe_commits(&mut self, observer: CommitObserver) -> Subscription;

    /// The history capability, if this host has one.
    fn history(&mut self) -> Option<&mut dyn HistoryHost>;
}

// ============================================================================
// MemoryHistory
// ============================================================================

/// In-memory router and history stack.
///
/// In-app navigation ([`navigate`](Self::navigate),
/// [`redirect`](Self::redirect)) runs guards and notifies commit observers.
/// Native navigation ([`back`](Self::back), [`forward`](Self::forward),
/// [`go`](Self::go), [`external_push`](Self::external_push)) bypasses
/// guards and notifies history listeners instead.
///
/// # Example
///
/// ```
/// use nav_confine::MemoryHistory;
///
/// let mut history = MemoryHistory::new("/");
/// history.navigate("/flow/abc");
/// history.back();
/// assert_eq!(history.current_path(), "/");
/// assert!(history.can_go_forward());
/// ```
pub struct MemoryHistory {
    entries: Vec<Location>,
    current: usize,
    has_history: bool,
    guards: SubscriberSet<Rc<dyn TransitionGuard>>,
    commit_observers: SubscriberSet<CommitObserver>,
    listeners: SubscriberSet<HistoryListener>,
    pending: VecDeque<HistoryEvent>,
    dispatching: bool,
}

impl MemoryHistory {
    /// Create a history with a single entry.
    pub fn new(initial: impl Into<Location>) -> Self {
        Self::with_entries(vec![initial.into()], 0)
    }

    /// Create a history from existing entries, positioned at `current`.
    ///
    /// An empty list becomes `["/"]`; an out-of-range index is clamped.
    pub fn with_entries(entries: Vec<Location>, current: usize) -> Self {
        let entries = if entries.is_empty() {
            vec![Location::from("/")]
        } else {
            entries
        };
        let current = current.min(entries.len() - 1);
        Self {
            entries,
            current,
            has_history: true,
            guards: SubscriberSet::new(),
            commit_observers: SubscriberSet::new(),
            listeners: SubscriberSet::new(),
            pending: VecDeque::new(),
            dispatching: false,
        }
    }

    /// A router without a history capability, as found on non-interactive hosts.
    pub fn headless(initial: impl Into<Location>) -> Self {
        Self {
            has_history: false,
            ..Self::new(initial)
        }
    }

    /// The visible location.
    pub fn current_location(&self) -> Location {
        self.entries[self.current].clone()
    }

    /// Get current path
    pub fn current_path(&self) -> &str {
        self.entries[self.current].as_str()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    /// Index of the visible entry.
    pub fn index(&self) -> usize {
        self.current
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    // ========================================================================
    // In-app navigation
    // ========================================================================

    /// Navigate to `to`, running guards first. Appends a history entry.
    pub fn navigate(&mut self, to: impl Into<Location>) -> NavigationResult {
        self.navigate_with_guards(to.into(), NavigateOp::Push)
    }

    /// Replace the current entry with `to`, running guards first.
    pub fn redirect(&mut self, to: impl Into<Location>) -> NavigationResult {
        self.navigate_with_guards(to.into(), NavigateOp::Replace)
    }

    fn navigate_with_guards(&mut self, to: Location, op: NavigateOp) -> NavigationResult {
        let from = self.current_location();
        info_log!("Navigation {:?}: '{}' → '{}'", op, from, to);
        let request = NavigationRequest::with_from(to.clone(), from);

        if let NavigationAction::Deny { reason } = self.run_guards(&request) {
            warn_log!("Navigation to '{}' blocked: {}", to, reason);
            return NavigationResult::Blocked { reason };
        }

        match op {
            NavigateOp::Push => self.push_entry(to),
            NavigateOp::Replace => self.entries[self.current] = to,
        }
        self.notify_commit();

        NavigationResult::Success {
            path: self.current_path().to_string(),
        }
    }

    fn run_guards(&self, request: &NavigationRequest) -> NavigationAction {
        let mut guards = self.guards.snapshot();
        guards.sort_by_key(|guard| std::cmp::Reverse(guard.priority()));
        debug_log!("Checking {} guards for '{}'", guards.len(), request.to);

        for guard in &guards {
            let result = guard.check(request);
            trace_log!(
                "Guard '{}' (priority {}) → {:?}",
                guard.name(),
                guard.priority(),
                result
            );
            if result.is_deny() {
                return result;
            }
        }
        NavigationAction::Continue
    }

    // ========================================================================
    // Native navigation
    // ========================================================================

    /// Native back button.
    pub fn back(&mut self) -> NavigationResult {
        self.go(-1)
    }

    /// Native forward button.
    pub fn forward(&mut self) -> NavigationResult {
        self.go(1)
    }

    /// Move `delta` entries through the stack, as a native history traversal.
    pub fn go(&mut self, delta: isize) -> NavigationResult {
        let Some(target) = self.current.checked_add_signed(delta) else {
            return NavigationResult::Unchanged;
        };
        if delta == 0 || target >= self.entries.len() {
            return NavigationResult::Unchanged;
        }
        self.current = target;
        self.dispatch(HistoryEvent::native(self.current_location()))
    }

    /// A location change the router did not mediate, e.g. an edited
    /// address or a hash change. Appends an entry and notifies listeners.
    pub fn external_push(&mut self, to: impl Into<Location>) -> NavigationResult {
        self.push_entry(to.into());
        self.dispatch(HistoryEvent::native(self.current_location()))
    }

    fn dispatch(&mut self, event: HistoryEvent) -> NavigationResult {
        self.pending.push_back(event);
        if self.dispatching {
            return NavigationResult::Success {
                path: self.current_path().to_string(),
            };
        }
        self.dispatching = true;
        let mut depth = 0;

        while let Some(event) = self.pending.pop_front() {
            if depth > MAX_CORRECTION_DEPTH {
                error_log!(
                    "Correction loop detected (depth {}) at '{}'; dropping {} queued events",
                    depth,
                    event.location,
                    self.pending.len() + 1
                );
                self.pending.clear();
                break;
            }
            debug_log!("History event {:?} → '{}'", event.origin, event.location);

            let mut corrections = Vec::new();
            self.listeners.for_each(|listener| {
                let correction = listener(&event);
                if !correction.is_accept() {
                    corrections.push(correction);
                }
            });

            // The first listener to ask for a correction wins.
            if let Some(correction) = corrections.into_iter().next() {
                self.apply(&correction);
                depth += 1;
            }
        }
        self.dispatching = false;

        NavigationResult::Success {
            path: self.current_path().to_string(),
        }
    }

    fn push_entry(&mut self, location: Location) {
        self.entries.truncate(self.current + 1);
        self.entries.push(location);
        self.current += 1;
    }

    fn notify_commit(&self) {
        let location = self.current_location();
        self.commit_observers.for_each(|observer| observer(&location));
    }
}

impl HistoryHost for MemoryHistory {
    fn current_location(&self) -> Location {
        MemoryHistory::current_location(self)
    }

    fn subscribe(&mut self, listener: HistoryListener) -> Subscription {
        self.listeners.insert(listener)
    }

    fn push(&mut self, location: Location) {
        self.push_entry(location);
        self.notify_commit();
    }

    fn replace(&mut self, location: Location) {
        trace_log!("Replacing entry {} with '{}'", self.current, location);
        self.entries[self.current] = location;
        self.notify_commit();
    }

    fn go_back(&mut self, steps: usize) -> bool {
        if steps == 0 || steps > self.current {
            return false;
        }
        self.current -= steps;
        // Inside a dispatch the echo is queued; otherwise it is delivered now.
        self.dispatch(HistoryEvent::correction(self.current_location()));
        true
    }
}

impl NavigationHost for MemoryHistory {
    fn current_location(&self) -> Location {
        MemoryHistory::current_location(self)
    }

    fn install_guard(&mut self, guard: Rc<dyn TransitionGuard>) -> Subscription {
        debug_log!("Installing guard '{}'", guard.name());
        self.guards.insert(guard)
    }

    fn observe_commits(&mut self, observer: CommitObserver) -> Subscription {
        self.commit_observers.insert(observer)
    }

    fn history(&mut self) -> Option<&mut dyn HistoryHost> {
        if self.has_history {
            Some(self as &mut dyn HistoryHost)
        } else {
            None
        }
    }
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("entries", &self.entries)
            .field("current", &self.current)
            .field("has_history", &self.has_history)
            .finish_non_exhaustive()
    }
}

/// Internal enum for the kind of in-app navigation to commit.
#[derive(Debug, Clone, Copy)]
enum NavigateOp {
    Push,
    Replace,
}
