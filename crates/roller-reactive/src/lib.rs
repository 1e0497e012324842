#![forbid(unsafe_code)]

//! Reactive primitives for the panel roller.
//!
//! - [`Observable`]: shared value with change notification and no-op
//!   suppression for unchanged writes.
//! - [`Subscription`]: RAII guard keeping a callback registered.
//! - [`Endpoint`]: a readable, writable, observable property.
//! - [`TwoWayBinding`]: keeps two endpoints equal in both directions.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`). Propagation is
//! synchronous: when `set` returns, every bound property has been updated.

pub mod binding;
pub mod observable;

pub use binding::{Endpoint, TwoWayBinding};
pub use observable::{Observable, Subscription};
