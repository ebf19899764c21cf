#![forbid(unsafe_code)]

//! Reactive primitives shared by the store and the modal coordinator.

pub mod observable;

pub use observable::{Observable, Subscription};
