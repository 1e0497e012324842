#![forbid(unsafe_code)]

//! Observable properties with change notification.
//!
//! # Design
//!
//! [`Observable<T>`] keeps a value in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). Writes are compared against the stored value with
//! `PartialEq`; only a real change bumps the version and notifies
//! subscribers, in registration order.
//!
//! Writing the current value is a no-op. Two-way bindings rely on this to
//! terminate: once both sides hold the same value, no further notification
//! can be produced.
//!
//! # Re-entrancy
//!
//! The interior borrow is released before subscribers run, so a subscriber
//! may read or write any observable (including the one that notified it).
//! A nested write notifies immediately, before the outer notification loop
//! resumes.
//!
//! # Write policy
//!
//! An owner may [`constrain`](Observable::constrain) writes: every value is
//! passed through the policy before it is compared and stored, so
//! subscribers never observe a value the policy would reject.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{trace, trace_span};
use web_time::Instant;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;
type PolicyRc<T> = Rc<dyn Fn(T) -> T>;
type PolicyWeak<T> = Weak<dyn Fn(T) -> T>;

struct Slot<T> {
    value: T,
    version: u64,
    /// Weak handles; the strong side lives in the [`Subscription`].
    subscribers: Vec<CallbackWeak<T>>,
    policy: Option<PolicyWeak<T>>,
}

/// A shared, versioned property with change notification.
///
/// Cloning an `Observable` yields another handle to the **same** slot.
pub struct Observable<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Observable")
            .field("value", &slot.value)
            .field("version", &slot.version)
            .field("subscribers", &slot.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                value,
                version: 0,
                subscribers: Vec::new(),
                policy: None,
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.slot.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not write to this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.borrow().value)
    }

    /// Store `value` and notify subscribers if it differs from the current
    /// value. Returns whether a change happened.
    pub fn set(&self, value: T) -> bool {
        let value = self.admit(value);
        {
            let mut slot = self.slot.borrow_mut();
            if slot.value == value {
                return false;
            }
            slot.value = value;
            slot.version += 1;
        }
        self.notify();
        true
    }

    /// Mutate a copy of the value and store it as with [`set`](Self::set).
    /// Subscribers are notified only if the result differs from the
    /// previous value.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }

    /// Register `callback` to run with the new value after every change.
    ///
    /// The callback stays registered for as long as the returned
    /// [`Subscription`] is alive.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.slot
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription::hold(strong)
    }

    /// Route every later write through `policy` before it is stored.
    ///
    /// Only one policy is active; installing another replaces it. The
    /// policy is removed when the returned [`Subscription`] is dropped. It
    /// must not write to this observable.
    pub fn constrain(&self, policy: impl Fn(T) -> T + 'static) -> Subscription {
        let strong: PolicyRc<T> = Rc::new(policy);
        self.slot.borrow_mut().policy = Some(Rc::downgrade(&strong));
        Subscription::hold(strong)
    }

    /// Number of value-changing writes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.slot.borrow().subscribers.len()
    }

    /// True when both handles share the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    fn admit(&self, value: T) -> T {
        let policy = self.slot.borrow().policy.as_ref().and_then(Weak::upgrade);
        match policy {
            Some(policy) => policy(value),
            None => value,
        }
    }

    fn notify(&self) {
        let (callbacks, value) = {
            let mut slot = self.slot.borrow_mut();
            slot.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<CallbackRc<T>> =
                slot.subscribers.iter().filter_map(Weak::upgrade).collect();
            (callbacks, slot.value.clone())
        };
        if callbacks.is_empty() {
            return;
        }

        let started = Instant::now();
        let _span = trace_span!(
            "roller.propagate",
            subscribers = callbacks.len() as u64,
            duration_us = tracing::field::Empty
        )
        .entered();

        for cb in &callbacks {
            cb(&value);
        }

        let duration_us = started.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
        trace!(duration_us, "propagation finished");
    }
}

/// RAII guard for a registered callback.
///
/// Dropping it releases the only strong reference to the callback, so the
/// source can no longer upgrade its weak handle.
#[must_use = "dropping a Subscription detaches the callback"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Keep `guard` alive for the lifetime of the subscription.
    ///
    /// Sources that store callbacks weakly hand the strong side out through
    /// this constructor.
    pub fn hold(guard: impl std::any::Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
