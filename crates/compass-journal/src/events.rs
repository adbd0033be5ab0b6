//! Change notification for derived views.
//!
//! The journal notifies a subscriber list synchronously after each
//! committed structural change (commit, abort, truncation, prune) --
//! exactly once per change, never per intermediate mutation.
//!
//! Subscribers are held weakly: a view keeps its [`Subscription`] alive
//! for as long as it wants callbacks, and dead subscribers are swept on
//! the next notify. Callbacks run while the journal is being mutated,
//! so they must not call back into it; the built-in views only mark
//! themselves stale.

use std::rc::{Rc, Weak};

/// Why the views were republished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    /// A staged navigation committed or the structure changed
    /// (record, truncation, removal, prune).
    Structure,
    /// A navigation was staged; structure is unchanged but the staged
    /// position moved.
    Staged,
    /// A staged navigation was aborted; structure is unchanged but the
    /// staged position reverted.
    Abort,
}

/// A live subscription handle. Dropping it unsubscribes.
pub type Subscription = Rc<dyn Fn(ViewChange)>;

/// Synchronous observer list.
#[derive(Default)]
pub struct ChangePublisher {
    subscribers: Vec<Weak<dyn Fn(ViewChange)>>,
}

impl ChangePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; the returned handle keeps it alive.
    pub fn subscribe<F: Fn(ViewChange) + 'static>(&mut self, f: F) -> Subscription {
        let strong: Subscription = Rc::new(f);
        self.subscribers.push(Rc::downgrade(&strong));
        strong
    }

    /// Notify all live subscribers, sweeping dead ones.
    pub fn notify(&mut self, change: ViewChange) {
        self.subscribers.retain(|weak| match weak.upgrade() {
            Some(f) => {
                f(change);
                true
            },
            None => false,
        });
    }

    /// Number of live subscribers (dead ones may still be counted
    /// until the next notify).
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for ChangePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePublisher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
