//! Scoped host subscriptions.
//!
//! Hosts keep their callbacks in a [`SubscriberSet`] and hand out a
//! [`Subscription`] per registration. Dropping the `Subscription` removes
//! the callback, so a guard that is torn down can never be called again.
//! Callbacks may drop their own (or another) subscription while being
//! invoked.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

struct Registry<F> {
    next_id: usize,
    // `None` while the callback is checked out by `for_each`.
    entries: BTreeMap<usize, Option<F>>,
}

/// Ordered set of callbacks of type `F`.
pub struct SubscriberSet<F> {
    inner: Rc<RefCell<Registry<F>>>,
}

impl<F: 'static> SubscriberSet<F> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: BTreeMap::new(),
            })),
        }
    }

    /// Register `callback`; it stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn insert(&self, callback: F) -> Subscription {
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.insert(id, Some(callback));
            id
        };

        let weak: Weak<RefCell<Registry<F>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut registry) = inner.try_borrow_mut() {
                    registry.entries.remove(&id);
                }
            }
        })
    }

    /// Number of live callbacks.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// `true` when no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke `f` on every callback in registration order.
    ///
    /// Each callback is checked out of the registry while it runs, so the
    /// registry is never borrowed across a call.
    pub fn for_each(&self, mut f: impl FnMut(&mut F)) {
        let ids: Vec<usize> = self.inner.borrow().entries.keys().copied().collect();
        for id in ids {
            let callback = self
                .inner
                .borrow_mut()
                .entries
                .get_mut(&id)
                .and_then(Option::take);
            let Some(mut callback) = callback else {
                continue;
            };
            f(&mut callback);
            // Put it back unless it was unsubscribed during the call.
            if let Some(slot) = self.inner.borrow_mut().entries.get_mut(&id) {
                *slot = Some(callback);
            }
        }
    }
}

impl<F: Clone + 'static> SubscriberSet<F> {
    /// Clone out every live callback.
    pub fn snapshot(&self) -> Vec<F> {
        self.inner
            .borrow()
            .entries
            .values()
            .filter_map(Clone::clone)
            .collect()
    }
}

impl<F: 'static> Default for SubscriberSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle that releases a host registration when dropped.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a release action.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription that owns nothing.
    pub fn inert() -> Self {
        Self { release: None }
    }

    /// Keep the registration alive for as long as the host lives.
    pub fn detach(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
