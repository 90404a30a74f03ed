//! SyncExternalStore: the renderer-side half of an external store
//! subscription.
//!
//! A consumer of a store it does not own subscribes before it reads, so
//! nothing published in between is missed. Every notification asks the host
//! for a re-render. The subscription is removed on teardown or drop.
//!
//! # Locking
//!
//! The `parking_lot::Mutex` only guards the current [`Unsubscribe`] handle
//! and is never held while calling out, so callbacks may re-enter the store.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// An owned one-shot closure that removes a subscription when called.
pub type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Host callback that schedules a re-render of the consuming component.
pub type Rerender = Arc<dyn Fn() + Send + Sync>;

/// Subscription slot for one consumer of an external store.
pub struct SyncExternalStore {
    rerender: Rerender,
    active: Mutex<Option<Unsubscribe>>,
}

impl SyncExternalStore {
    pub fn new(rerender: Rerender) -> Self {
        Self {
            rerender,
            active: Mutex::new(None),
        }
    }

    /// Make sure a subscription exists, then read the snapshot.
    ///
    /// `subscribe` runs only when no subscription is active. It receives a
    /// notifier to call on every store change and returns the matching
    /// [`Unsubscribe`].
    pub fn sync<T>(
        &self,
        subscribe: impl FnOnce(Rerender) -> Unsubscribe,
        get_snapshot: impl FnOnce() -> T,
    ) -> T {
        if !self.is_subscribed() {
            let unsubscribe = subscribe(self.notifier());
            let previous = {
                let mut active = self.active.lock();
                if active.is_some() {
                    // Another caller subscribed while `subscribe` ran.
                    Some(unsubscribe)
                } else {
                    *active = Some(unsubscribe);
                    None
                }
            };
            if let Some(extra) = previous {
                extra();
            } else {
                tracing::debug!("external store subscribed");
            }
        }
        get_snapshot()
    }

    /// Drop the current subscription (if any) and subscribe again.
    pub fn resubscribe(&self, subscribe: impl FnOnce(Rerender) -> Unsubscribe) {
        self.teardown();
        self.sync(subscribe, || ());
    }

    /// Remove the active subscription. Returns `false` if there was none.
    pub fn teardown(&self) -> bool {
        let unsubscribe = self.active.lock().take();
        match unsubscribe {
            Some(unsubscribe) => {
                unsubscribe();
                tracing::debug!("external store unsubscribed");
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Wrap the host's re-render callback so a panicking host cannot unwind
    /// into the store that is notifying it.
    fn notifier(&self) -> Rerender {
        let rerender = Arc::clone(&self.rerender);
        Arc::new(move || {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rerender()));
            if outcome.is_err() {
                tracing::warn!("re-render callback panicked; notification dropped");
            }
        })
    }
}

impl Drop for SyncExternalStore {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.active.get_mut().take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for SyncExternalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncExternalStore")
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
