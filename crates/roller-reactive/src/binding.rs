#![forbid(unsafe_code)]

//! Two-way property bindings.
//!
//! A [`TwoWayBinding`] links two [`Endpoint`]s so that a change on either
//! side is written to the other, synchronously, before the writer regains
//! control. Neither side is authoritative: the last write wins.
//!
//! # Cycle breaking
//!
//! Two mechanisms stop a write from bouncing back and forth:
//!
//! 1. Endpoints ignore writes of their current value (see
//!    [`Observable::set`]), so a mirrored write produces no notification.
//! 2. The binding holds a `propagating` flag while it writes to the far
//!    side; a notification that arrives while the flag is set came from the
//!    binding itself and is dropped.
//!
//! # Convergence
//!
//! An endpoint may adjust a written value (a panel index clamps to the
//! number of panels, for example). After each write the binding reads the
//! far side back and, if it differs, writes the accepted value to the near
//! side. A subscriber of the far side may also rewrite the near side while
//! the guard is held; the binding notices on read-back and treats that as
//! the latest write. Both endpoints therefore end up holding the same value.

use std::cell::Cell;
use std::rc::Rc;

use tracing::warn;

use crate::observable::{Observable, Subscription};

/// One side of a binding: a readable, writable, observable property.
///
/// Implementors decide their own write policy. `set` returns whether the
/// stored value changed, and must not notify when it did not.
pub trait Endpoint<T>: Clone + 'static {
    /// Current value.
    fn get(&self) -> T;

    /// Write `value`, possibly adjusted by the endpoint's policy.
    fn set(&self, value: T) -> bool;

    /// Run `callback` after every change.
    fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription;
}

impl<T: Clone + PartialEq + 'static> Endpoint<T> for Observable<T> {
    fn get(&self) -> T {
        Observable::get(self)
    }

    fn set(&self, value: T) -> bool {
        Observable::set(self, value)
    }

    fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        Observable::subscribe(self, callback)
    }
}

/// A bidirectional link between two endpoints.
///
/// On construction the `to` side takes the value of the `from` side.
/// Dropping the binding disconnects both directions.
pub struct TwoWayBinding<T> {
    propagating: Rc<Cell<bool>>,
    read_from: Box<dyn Fn() -> T>,
    read_to: Box<dyn Fn() -> T>,
    _forward: Subscription,
    _backward: Subscription,
}

impl<T: Clone + PartialEq + 'static> TwoWayBinding<T> {
    /// Link `from` and `to`, copying the current `from` value across.
    pub fn new<A, B>(from: &A, to: &B) -> Self
    where
        A: Endpoint<T>,
        B: Endpoint<T>,
    {
        let propagating = Rc::new(Cell::new(false));

        push(&propagating, from, to, from.get());

        let forward = {
            let guard = Rc::clone(&propagating);
            let (near, far) = (from.clone(), to.clone());
            from.subscribe(move |value| push(&guard, &near, &far, value.clone()))
        };
        let backward = {
            let guard = Rc::clone(&propagating);
            let (near, far) = (to.clone(), from.clone());
            to.subscribe(move |value| push(&guard, &near, &far, value.clone()))
        };

        let read_from = {
            let from = from.clone();
            Box::new(move || from.get()) as Box<dyn Fn() -> T>
        };
        let read_to = {
            let to = to.clone();
            Box::new(move || to.get()) as Box<dyn Fn() -> T>
        };

        Self {
            propagating,
            read_from,
            read_to,
            _forward: forward,
            _backward: backward,
        }
    }

    /// Current `(from, to)` values.
    #[must_use]
    pub fn values(&self) -> (T, T) {
        ((self.read_from)(), (self.read_to)())
    }

    /// True when both endpoints hold the same value.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        let (from, to) = self.values();
        from == to
    }

    /// True while the binding is writing to one of its endpoints.
    #[must_use]
    pub fn is_propagating(&self) -> bool {
        self.propagating.get()
    }
}

impl<T> std::fmt::Debug for TwoWayBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoWayBinding")
            .field("propagating", &self.propagating.get())
            .finish_non_exhaustive()
    }
}

/// Upper bound on settle passes for one propagation.
const MAX_SETTLE_PASSES: usize = 16;

/// Write `value` from `near` to `far` under the guard, then settle both
/// sides.
///
/// Whatever `far` accepted is written back to `near`. If `near` was
/// rewritten while `far` was being updated (by another subscriber of
/// `far`), that newer value is pushed to `far` in turn. Passes repeat until
/// both sides agree.
fn push<T, N, F>(guard: &Cell<bool>, near: &N, far: &F, value: T)
where
    T: Clone + PartialEq + 'static,
    N: Endpoint<T>,
    F: Endpoint<T>,
{
    if guard.get() {
        return;
    }
    guard.set(true);

    let mut value = value;
    let mut settled = false;
    for _ in 0..MAX_SETTLE_PASSES {
        far.set(value.clone());
        let current = near.get();
        if current != value {
            value = current;
            continue;
        }
        let accepted = far.get();
        if accepted == current {
            settled = true;
            break;
        }
        near.set(accepted);
        value = near.get();
    }
    guard.set(false);

    if !settled {
        warn!(
            passes = MAX_SETTLE_PASSES,
            "binding endpoints kept rewriting each other; left unsettled"
        );
    }
}
