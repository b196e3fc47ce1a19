//! Completion-order collection.
//!
//! Both collectors keep the set of units that have not finished yet, keyed
//! by `(deadline, delay, index)`. A finished unit is held back until every
//! unit with a smaller key has finished too, then released. Timers fire in
//! deadline order, so this only reorders units whose timers fired in the
//! same tick, and it does not depend on how many completions a single wake
//! happens to observe.

use std::collections::{BTreeMap, BTreeSet};

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use kata_types::MaxDelay;
use tokio::task::JoinSet;

use crate::FanoutError;
use crate::producer::{Completion, DelayTask, OrderKey, produce};
use crate::source::UniformDelay;

/// Run `n` random waits on the calling task and return their delays in
/// completion order.
pub async fn wait_n(n: usize, max_delay: MaxDelay) -> Vec<f64> {
    let tasks = produce(n, max_delay, &mut UniformDelay);
    collect_in_completion_order(tasks).await
}

/// Like [`wait_n`], but every unit is a spawned tokio task.
///
/// Must be called from within a tokio runtime.
pub async fn task_wait_n(n: usize, max_delay: MaxDelay) -> Result<Vec<f64>, FanoutError> {
    let tasks = produce(n, max_delay, &mut UniformDelay);
    collect_spawned(tasks).await
}

/// Drive `tasks` concurrently on the current task.
pub async fn collect_in_completion_order(tasks: Vec<DelayTask>) -> Vec<f64> {
    let total = tasks.len();
    let mut order = Release::new(&tasks);
    let mut pending: FuturesUnordered<_> = tasks.into_iter().map(DelayTask::run).collect();

    while let Some(done) = pending.next().await {
        order.complete(done);
    }

    tracing::info!(tasks = total, "fan-in complete");
    order.finish()
}

/// Spawn every task onto the runtime and collect them through a [`JoinSet`].
///
/// If a unit fails to join, the remaining units are aborted when the set drops.
pub async fn collect_spawned(tasks: Vec<DelayTask>) -> Result<Vec<f64>, FanoutError> {
    let total = tasks.len();
    let mut order = Release::new(&tasks);
    let mut set = JoinSet::new();
    for task in tasks {
        set.spawn(task.run());
    }

    while let Some(joined) = set.join_next().await {
        order.complete(joined?);
    }

    tracing::info!(tasks = total, "spawned fan-in complete");
    Ok(order.finish())
}

/// Holds finished units back until no earlier unit is still running.
struct Release {
    running: BTreeSet<OrderKey>,
    finished: BTreeMap<OrderKey, f64>,
    results: Vec<f64>,
}

impl Release {
    fn new(tasks: &[DelayTask]) -> Self {
        Self {
            running: tasks.iter().map(DelayTask::order_key).collect(),
            finished: BTreeMap::new(),
            results: Vec::with_capacity(tasks.len()),
        }
    }

    fn complete(&mut self, done: Completion) {
        let key = done.order_key();
        self.running.remove(&key);
        self.finished.insert(key, done.delay.as_secs_f64());

        let ready = match self.running.first() {
            Some(earliest) => {
                let held = self.finished.split_off(earliest);
                std::mem::replace(&mut self.finished, held)
            }
            None => std::mem::take(&mut self.finished),
        };
        self.results.extend(ready.into_values());
    }

    fn finish(self) -> Vec<f64> {
        debug_assert!(self.running.is_empty() && self.finished.is_empty());
        self.results
    }
}
