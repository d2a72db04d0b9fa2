//! # Store
//!
//! A state container with `subscribe` / `get_snapshot` / `dispatch`.
//!
//! ## Dispatch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  store.dispatch(action)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock ──► next = state.clone() ──► next.reduce(action)                  │
//! │                                         │                               │
//! │              ┌──────────────────────────┼───────────────────────┐       │
//! │              ▼                          ▼                       ▼       │
//! │          Err(e)                    Ok(false)                 Ok(true)   │
//! │       state untouched            state untouched          state = next  │
//! │       return Err(e)              nobody notified          version += 1  │
//! │                                                                 │       │
//! │  unlock ◄───────────────────────────────────────────────────────┘       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  each listener(&snapshot)   ← outside the lock, so a listener may       │
//! │                               read or dispatch on the store again       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The state is logically single-writer. The `Arc<Mutex<_>>` is there so
//! clones of a store can move into tokio tasks. A poisoned lock is
//! recovered: a reducer never leaves a half-applied state behind, since it
//! works on a copy.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// State that can be changed by dispatching actions.
pub trait Reducer: Clone + Send + 'static {
    type Action;
    type Error;

    /// Short name for log lines.
    const NAME: &'static str;

    /// Applies `action`. Returns whether anything changed.
    fn reduce(&mut self, action: Self::Action) -> Result<bool, Self::Error>;
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct Inner<S> {
    state: S,
    version: u64,
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
}

/// Shared state container. Clones share the same state.
pub struct Store<S> {
    inner: Arc<Mutex<Inner<S>>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Store {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Clone + Send + 'static> Store<S> {
    pub fn new(state: S) -> Self {
        Store {
            inner: Arc::new(Mutex::new(Inner {
                state,
                version: 0,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current state.
    pub fn get_snapshot(&self) -> S {
        self.lock().state.clone()
    }

    /// Reads the state without cloning it.
    ///
    /// ## Note
    /// `f` runs under the lock; it must not call back into this store.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().state)
    }

    /// Number of changes applied so far.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Registers a listener called after every change.
    pub fn subscribe(&self, listener: impl Fn(&S) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        inner.listeners.len() != before
    }

    /// Swaps in a whole new state (a reload) and notifies listeners.
    pub fn replace(&self, state: S) {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            inner.state = state;
            inner.version += 1;
            (inner.state.clone(), Self::listeners(&inner))
        };
        Self::notify(&snapshot, &listeners);
    }

    fn listeners(inner: &Inner<S>) -> Vec<Listener<S>> {
        inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    fn notify(snapshot: &S, listeners: &[Listener<S>]) {
        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl<S: Reducer> Store<S> {
    /// Reduces `action` onto the state.
    ///
    /// On error or no-op the state is left exactly as it was and no
    /// listener runs.
    pub fn dispatch(&self, action: S::Action) -> Result<bool, S::Error> {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            let mut next = inner.state.clone();
            if !next.reduce(action)? {
                return Ok(false);
            }
            inner.state = next;
            inner.version += 1;
            debug!(store = S::NAME, version = inner.version, "State changed");
            (inner.state.clone(), Self::listeners(&inner))
        };

        Self::notify(&snapshot, &listeners);
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
