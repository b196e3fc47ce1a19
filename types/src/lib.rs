//! Core domain types for kata.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The fan-out crate, the config layer and the CLI all agree on these.

mod delay;

pub use delay::{BoundError, Delay, MaxDelay};
