//! Delay-task production.
//!
//! A [`DelayTask`] is a single suspend-then-resume unit: it sleeps until its
//! deadline and reports the delay it was given. Tasks produced together share
//! one start instant, so their deadlines order exactly like their delays.

use kata_types::{Delay, MaxDelay};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};

use crate::source::{DelaySource, UniformDelay};

/// One unit of scheduled work.
#[derive(Debug, Clone, Copy)]
pub struct DelayTask {
    index: usize,
    delay: Delay,
    deadline: Instant,
}

/// A finished [`DelayTask`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    pub index: usize,
    pub delay: Delay,
    pub deadline: Instant,
}

/// Release order of a unit: deadline, then delay, then submission index.
///
/// Delays are finite and non-negative, so their bit patterns order like the
/// values themselves.
pub(crate) type OrderKey = (Instant, u64, usize);

fn order_key(deadline: Instant, delay: Delay, index: usize) -> OrderKey {
    (deadline, delay.as_secs_f64().to_bits(), index)
}

impl Completion {
    pub(crate) fn order_key(&self) -> OrderKey {
        order_key(self.deadline, self.delay, self.index)
    }
}

impl DelayTask {
    #[must_use]
    pub fn new(index: usize, delay: Delay, origin: Instant) -> Self {
        Self {
            index,
            delay,
            deadline: origin + delay.as_duration(),
        }
    }

    /// Submission index within the batch it was produced in.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn delay(&self) -> Delay {
        self.delay
    }

    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    pub(crate) fn order_key(&self) -> OrderKey {
        order_key(self.deadline, self.delay, self.index)
    }

    /// Suspend until the deadline, then report.
    pub async fn run(self) -> Completion {
        sleep_until(self.deadline).await;
        tracing::debug!(
            index = self.index,
            delay = self.delay.as_secs_f64(),
            "delay task completed"
        );
        Completion {
            index: self.index,
            delay: self.delay,
            deadline: self.deadline,
        }
    }
}

/// Build `n` delay tasks with delays drawn from `source`.
///
/// All tasks share the current instant as their origin. `n == 0` yields an
/// empty batch.
pub fn produce(n: usize, max_delay: MaxDelay, source: &mut impl DelaySource) -> Vec<DelayTask> {
    let origin = Instant::now();
    (0..n)
        .map(|index| DelayTask::new(index, source.next_delay(max_delay), origin))
        .collect()
}

/// Wait a uniformly random time in `[0, max_delay)` and return it in seconds.
pub async fn wait_random(max_delay: MaxDelay) -> f64 {
    let delay = UniformDelay.next_delay(max_delay);
    sleep(delay.as_duration()).await;
    delay.as_secs_f64()
}

/// [`wait_random`] spawned onto the current runtime.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn task_wait_random(max_delay: MaxDelay) -> JoinHandle<f64> {
    tokio::spawn(wait_random(max_delay))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::source::FixedDelays;

    #[tokio::test(start_paused = true)]
    async fn produce_shares_origin() {
        let mut source = FixedDelays::new([3.0, 1.0, 2.0]);
        let tasks = produce(3, MaxDelay::from_secs(5), &mut source);

        assert_eq!(tasks.len(), 3);
        let origin = tasks[0].deadline() - tasks[0].delay().as_duration();
        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.index(), i);
            assert_eq!(task.deadline() - task.delay().as_duration(), origin);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn largest_bound_schedules_without_overflow() {
        let max = MaxDelay::new(MaxDelay::MAX_SECS).unwrap();
        let tasks = produce(2, max, &mut FixedDelays::new([1e299, MaxDelay::MAX_SECS]));

        for task in &tasks {
            assert!(task.delay().as_secs_f64() < MaxDelay::MAX_SECS);
            assert!(task.deadline() > Instant::now());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn produce_zero_is_empty() {
        assert!(produce(0, MaxDelay::from_secs(5), &mut UniformDelay).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_sleeps_for_its_delay() {
        let start = Instant::now();
        let task = DelayTask::new(7, MaxDelay::from_secs(5).bounded(2.0), start);

        let done = task.run().await;

        assert_eq!(done.index, 7);
        assert_eq!(done.delay.as_secs_f64(), 2.0);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_random_returns_slept_delay() {
        let start = Instant::now();
        let delay = wait_random(MaxDelay::from_secs(10)).await;

        assert!((0.0..10.0).contains(&delay));
        let elapsed = start.elapsed().as_secs_f64();
        // Paused clock auto-advances to the (millisecond-rounded) deadline.
        assert!(elapsed >= delay && elapsed < delay + 0.01);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_random_zero_bound_is_immediate() {
        let start = Instant::now();
        assert_eq!(wait_random(MaxDelay::ZERO).await, 0.0);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn task_wait_random_spawns() {
        let handle = task_wait_random(MaxDelay::from_secs(3));
        let delay = handle.await.unwrap();
        assert!((0.0..3.0).contains(&delay));
    }
}
