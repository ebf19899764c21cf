#![forbid(unsafe_code)]

//! Shared value with synchronous change notification.
//!
//! [`Observable<T>`] keeps its value in `Rc<RefCell<..>>` storage. Handles
//! are cheap clones of the same cell. A mutation that changes the value (by
//! `PartialEq`) bumps the version and calls every live subscriber, in
//! registration order, before the mutating call returns.
//!
//! # Re-entrancy
//!
//! The cell is never borrowed while callbacks run, so a subscriber may read
//! the value or mutate it again. A nested mutation notifies immediately;
//! subscribers registered after the one that mutated then see the newer
//! value first and the older value afterwards.
//!
//! # Subscriber lifetime
//!
//! Callbacks are held weakly. Dropping the [`Subscription`] guard detaches
//! the callback; dead entries are pruned on the next notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug_span, trace};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, versioned value with change notification.
///
/// # Invariants
///
/// 1. `version` grows by exactly 1 per value-changing mutation.
/// 2. Setting an equal value is a no-op: no version bump, no callbacks.
/// 3. Subscribers run in registration order.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
    label: &'static str,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            label: self.label,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("label", &self.label)
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::labeled("observable", value)
    }

    /// Observable whose notifications are traced under `label`.
    #[must_use]
    pub fn labeled(label: &'static str, value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
            label,
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not mutate this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value; notifies when it differs from the current one.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Modify the value in place; notifies when the result differs.
    ///
    /// Returns whether the value changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.value.clone();
            f(&mut inner.value);
            let changed = inner.value != before;
            if changed {
                inner.version += 1;
            }
            changed
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Register `callback` for future changes. The current value is not
    /// replayed.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let (callbacks, value, version) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<CallbackRc<T>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (callbacks, inner.value.clone(), inner.version)
        };
        if callbacks.is_empty() {
            return;
        }

        let _span = debug_span!(
            "observable.notify",
            label = self.label,
            version,
            subscribers = callbacks.len()
        )
        .entered();
        for callback in &callbacks {
            callback(&value);
        }
        trace!(label = self.label, version, "subscribers notified");
    }
}

/// RAII guard keeping a subscriber callback alive.
///
/// Dropping it detaches the callback.
#[must_use = "dropping a Subscription detaches the callback immediately"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
