//! A paced stream of random values, and its collected form.

use std::time::Duration;

use futures_util::stream::{self, Stream, StreamExt};
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerConfig {
    /// Values to emit before the stream ends.
    pub count: usize,
    /// Pause before each value.
    pub interval: Duration,
    /// Exclusive upper bound for emitted values.
    pub upper: f64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            count: 10,
            interval: Duration::from_secs(1),
            upper: 10.0,
        }
    }
}

/// Emit `config.count` values in `[0, upper)`, each after sleeping `interval`.
pub fn async_generator(config: TickerConfig) -> impl Stream<Item = f64> {
    stream::unfold(0usize, move |emitted| async move {
        if emitted >= config.count {
            return None;
        }
        sleep(config.interval).await;
        let value = sample(config.upper);
        tracing::trace!(emitted, value, "ticker value");
        Some((value, emitted + 1))
    })
}

/// Collect every value of [`async_generator`].
pub async fn async_comprehension(config: TickerConfig) -> Vec<f64> {
    async_generator(config).collect().await
}

fn sample(upper: f64) -> f64 {
    if !upper.is_finite() || upper <= 0.0 {
        return 0.0;
    }
    let value = rand::random::<f64>() * upper;
    if value < upper { value } else { upper.next_down() }
}
