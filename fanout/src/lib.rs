//! Bounded fan-out of delay tasks with completion-order collection.
//!
//! # Architecture
//!
//! ```text
//! produce(n, max_delay) -> [DelayTask; n] -> collect_* -> Vec<f64> (completion order)
//!                                  |
//!                                  v
//!                         time_cycle / measure_time
//! ```
//!
//! - [`producer`] - samples delays and builds [`DelayTask`]s sharing one start instant
//! - [`collector`] - awaits tasks in the order their timers fire
//! - [`measure`] - times a full fan-out/fan-in cycle
//! - [`ticker`] - a paced random-value stream and its collected form
//!
//! # Ordering
//!
//! Results come back in completion order. Tasks whose timers fire in the same
//! runtime tick (tokio timers have millisecond resolution) are ordered by
//! `(delay, submission index)`. A finished task is held back until every task
//! due before it has finished, so a collected sequence is non-decreasing no
//! matter how many tasks share a tick.
//!
//! The collectors are cooperative: each unit suspends on a tokio timer and
//! never blocks the thread. They are built for the current-thread runtime,
//! which is what [`measure::measure_time`] creates.

pub mod collector;
pub mod measure;
pub mod producer;
pub mod source;
pub mod ticker;

use thiserror::Error;

pub use kata_types::{BoundError, Delay, MaxDelay};

pub use collector::{collect_in_completion_order, collect_spawned, task_wait_n, wait_n};
pub use measure::{Measurement, measure_runtime, measure_time, time_cycle};
pub use producer::{Completion, DelayTask, produce, task_wait_random, wait_random};
pub use source::{DelaySource, FixedDelays, UniformDelay};
pub use ticker::{TickerConfig, async_comprehension, async_generator};

#[derive(Debug, Error)]
pub enum FanoutError {
    #[error(transparent)]
    Bound(#[from] BoundError),
    #[error("delay task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
    #[error("failed to build async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("measure_time blocks its thread and cannot run inside an async runtime")]
    InsideRuntime,
}
