//! Deduplicating publish/subscribe registry.
//!
//! RULE: A callback registered twice is still one subscription.
//! Identity is the `Arc` allocation, so register a clone of the same
//! `Arc` to refer to the same subscription.
//!
//! `notify` iterates over a snapshot taken when it starts. Callbacks may
//! register or unregister (through a shared handle) while it runs; those
//! changes apply from the next `notify`. A failing subscriber is logged
//! and counted and never stops the rest from running.
//!
//! Subscribers are plain synchronous closures and cannot suspend. Work
//! that has to await belongs in `Game::tick`, which the engine awaits
//! before it notifies tick listeners.

use std::sync::{Arc, Mutex, MutexGuard};

/// A subscriber for a channel carrying `A`.
pub type Callback<A> = Arc<dyn Fn(&A) -> anyhow::Result<()> + Send + Sync>;

/// Wrap a closure as a registrable callback.
pub fn callback<A, F>(f: F) -> Callback<A>
where
    F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn same_callback<A>(a: &Callback<A>, b: &Callback<A>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

pub struct CallbackRegistry<A> {
    name: &'static str,
    subscribers: Mutex<Vec<Callback<A>>>,
}

impl<A> CallbackRegistry<A> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Callback<A>>> {
        // A panic inside a subscriber never happens under this lock,
        // so a poisoned list is still consistent.
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a subscription. Returns false if it was already present.
    pub fn register(&self, callback: &Callback<A>) -> bool {
        let mut subscribers = self.lock();
        if subscribers.iter().any(|c| same_callback(c, callback)) {
            return false;
        }
        subscribers.push(Arc::clone(callback));
        true
    }

    /// Remove a subscription. Returns false if it was not present.
    pub fn unregister(&self, callback: &Callback<A>) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|c| !same_callback(c, callback));
        subscribers.len() != before
    }

    pub fn contains(&self, callback: &Callback<A>) -> bool {
        self.lock().iter().any(|c| same_callback(c, callback))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Invoke every subscription once, in registration order.
    /// Returns the number of subscribers that failed.
    pub fn notify(&self, args: &A) -> usize {
        let snapshot: Vec<Callback<A>> = self.lock().clone();
        let mut failed = 0;
        for subscriber in &snapshot {
            if let Err(e) = subscriber(args) {
                failed += 1;
                log::warn!("{}: subscriber failed: {e:#}", self.name);
            }
        }
        failed
    }
}

impl<A> Default for CallbackRegistry<A> {
    fn default() -> Self {
        Self::new("callbacks")
    }
}

impl<A> std::fmt::Debug for CallbackRegistry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("name", &self.name)
            .field("subscribers", &self.len())
            .finish()
    }
}
