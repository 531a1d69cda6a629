use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Shared state cell with a change flag.
///
/// Subscription callbacks (resize listeners, for instance) write through a
/// clone of the cell while the owning table reads it on its next update.
/// Cloning is cheap; all clones see the same value.
#[derive(Debug)]
pub struct State<T> {
    inner: Arc<RwLock<T>>,
    changed: Arc<AtomicBool>,
}

impl<T> State<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
            changed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    /// Store `value` if it differs from the current one.
    ///
    /// Returns `true` when the value changed.
    pub fn replace(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *guard == value {
            return false;
        }
        *guard = value;
        self.changed.store(true, Ordering::SeqCst);
        true
    }

    /// Return and clear the change flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::SeqCst)
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            changed: Arc::clone(&self.changed),
        }
    }
}

impl<T: Default> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
