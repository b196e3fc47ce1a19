//! Where sampled delays come from.

use kata_types::{Delay, MaxDelay};

/// Supplies one delay per produced task.
///
/// Implementations must stay within the bound they are handed; [`MaxDelay`]
/// only hands out values through [`MaxDelay::sample`] and
/// [`MaxDelay::bounded`], which enforce that.
pub trait DelaySource {
    fn next_delay(&mut self, max_delay: MaxDelay) -> Delay;
}

/// Uniform samples in `[0, max_delay)` from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformDelay;

impl DelaySource for UniformDelay {
    fn next_delay(&mut self, max_delay: MaxDelay) -> Delay {
        max_delay.sample(rand::random::<f64>())
    }
}

/// Replays a fixed list of delays (in seconds), cycling when exhausted.
///
/// Values outside the bound are pinned into it. An empty list yields zero.
#[derive(Debug, Clone, Default)]
pub struct FixedDelays {
    secs: Vec<f64>,
    cursor: usize,
}

impl FixedDelays {
    #[must_use]
    pub fn new(secs: impl Into<Vec<f64>>) -> Self {
        Self {
            secs: secs.into(),
            cursor: 0,
        }
    }
}

impl DelaySource for FixedDelays {
    fn next_delay(&mut self, max_delay: MaxDelay) -> Delay {
        if self.secs.is_empty() {
            return max_delay.bounded(0.0);
        }
        let secs = self.secs[self.cursor % self.secs.len()];
        self.cursor += 1;
        max_delay.bounded(secs)
    }
}
