//! Runtime measurement for fan-out cycles.

use std::time::Duration;

use futures_util::future::join_all;
use kata_types::MaxDelay;
use tokio::runtime::{Builder, Handle};
use tokio::time::Instant;

use crate::FanoutError;
use crate::collector::wait_n;
use crate::ticker::{TickerConfig, async_comprehension};

/// How many comprehensions [`measure_runtime`] runs side by side.
pub const PARALLEL_COMPREHENSIONS: usize = 4;

/// Wall-clock cost of one fan-out/fan-in cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub count: usize,
    pub total: Duration,
}

impl Measurement {
    /// Average contribution of each task; zero for an empty cycle.
    #[must_use]
    pub fn per_task(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total.div_f64(self.count as f64)
        }
    }
}

/// Time one [`wait_n`] cycle on the current runtime.
pub async fn time_cycle(n: usize, max_delay: MaxDelay) -> Measurement {
    let start = Instant::now();
    let results = wait_n(n, max_delay).await;
    let measurement = Measurement {
        count: results.len(),
        total: start.elapsed(),
    };
    tracing::info!(
        count = measurement.count,
        total_ms = measurement.total.as_millis() as u64,
        "fan-out cycle measured"
    );
    measurement
}

/// Blocking entry point: run one cycle on a fresh current-thread runtime and
/// return the average time per task.
///
/// Fails with [`FanoutError::InsideRuntime`] when called from a thread that
/// is already driving a tokio runtime; use [`time_cycle`] there instead.
pub fn measure_time(n: usize, max_delay: MaxDelay) -> Result<Duration, FanoutError> {
    if Handle::try_current().is_ok() {
        return Err(FanoutError::InsideRuntime);
    }
    let runtime = Builder::new_current_thread().enable_time().build()?;
    let measurement = runtime.block_on(time_cycle(n, max_delay));
    Ok(measurement.per_task())
}

/// Run [`PARALLEL_COMPREHENSIONS`] comprehensions concurrently and return the
/// total elapsed time.
///
/// Because they run side by side this is close to the duration of one, not
/// the sum of all of them.
pub async fn measure_runtime(config: TickerConfig) -> Duration {
    let start = Instant::now();
    let collected = join_all((0..PARALLEL_COMPREHENSIONS).map(|_| async_comprehension(config))).await;
    let elapsed = start.elapsed();
    tracing::info!(
        comprehensions = collected.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "parallel comprehensions measured"
    );
    elapsed
}
