//! State change subscriptions

use repcue_core::ExecutionState;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Callback invoked with a snapshot after every state change
pub type StateObserver = Box<dyn FnMut(&ExecutionState) + Send>;

#[derive(Default)]
struct ObserverList {
    next_id: u64,
    observers: Vec<(u64, StateObserver)>,
}

/// Set of observers owned by a coordinator
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    inner: Arc<Mutex<ObserverList>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: StateObserver) -> Subscription {
        let mut list = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = list.next_id;
        list.next_id += 1;
        list.observers.push((id, observer));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Call every observer with `state`.
    ///
    /// Observers run while the registry is locked, so they must not subscribe
    /// or unsubscribe from inside the callback.
    pub fn notify(&self, state: &ExecutionState) {
        let mut list = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, observer) in list.observers.iter_mut() {
            observer(state);
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observers
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by `on_state_change`; removes the observer when consumed
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ObserverList>>,
}

impl Subscription {
    /// Remove the observer. Returns false if it was already gone (or the
    /// coordinator no longer exists).
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.registry.upgrade() else {
            return false;
        };
        let mut list = inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = list.observers.len();
        list.observers.retain(|(id, _)| *id != self.id);
        list.observers.len() != before
    }
}
