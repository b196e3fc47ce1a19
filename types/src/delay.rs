//! Wait bounds and sampled waits.
//!
//! [`MaxDelay`] is valid by construction: finite, non-negative and no larger
//! than [`MaxDelay::MAX_SECS`], so it always converts to a `Duration` that can
//! be added to a clock reading. Every
//! [`Delay`] produced from it lies in `[0, max_delay)`, or is exactly zero when
//! the bound itself is zero.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundError {
    #[error("invalid argument: max delay must be between 0 and 31536000 seconds (got {0})")]
    InvalidArgument(f64),
    #[error("invalid argument: '{0}' is not a number of seconds")]
    Unparseable(String),
}

/// Upper bound (exclusive) on a single wait, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MaxDelay(f64);

impl MaxDelay {
    pub const ZERO: MaxDelay = MaxDelay(0.0);

    /// Largest accepted bound: 365 days.
    pub const MAX_SECS: f64 = 365.0 * 24.0 * 60.0 * 60.0;

    pub fn new(secs: f64) -> Result<Self, BoundError> {
        if (0.0..=Self::MAX_SECS).contains(&secs) {
            // Normalize -0.0 so Display never prints a sign.
            Ok(Self(secs.abs()))
        } else {
            Err(BoundError::InvalidArgument(secs))
        }
    }

    /// Whole seconds, saturating at [`MaxDelay::MAX_SECS`].
    #[must_use]
    pub fn from_secs(secs: u32) -> Self {
        Self(f64::from(secs).min(Self::MAX_SECS))
    }

    #[must_use]
    pub const fn as_secs_f64(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs_f64(self.0)
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Scale a unit sample into this bound.
    ///
    /// `unit` is clamped into `[0, 1)` first, so a misbehaving source can never
    /// produce a delay outside the bound.
    #[must_use]
    pub fn sample(self, unit: f64) -> Delay {
        if !unit.is_finite() {
            return Delay(0.0);
        }
        self.bounded(self.0 * unit.clamp(0.0, 1.0))
    }

    /// Pin an arbitrary number of seconds into `[0, max_delay)`.
    #[must_use]
    pub fn bounded(self, secs: f64) -> Delay {
        if self.is_zero() || !secs.is_finite() || secs <= 0.0 {
            Delay(0.0)
        } else if secs < self.0 {
            Delay(secs)
        } else {
            Delay(self.0.next_down())
        }
    }

    /// Whether `delay` is a value this bound could have produced.
    #[must_use]
    pub fn contains(self, delay: f64) -> bool {
        if self.is_zero() {
            delay == 0.0
        } else {
            (0.0..self.0).contains(&delay)
        }
    }
}

impl TryFrom<f64> for MaxDelay {
    type Error = BoundError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaxDelay> for f64 {
    fn from(value: MaxDelay) -> Self {
        value.0
    }
}

impl FromStr for MaxDelay {
    type Err = BoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs = s
            .trim()
            .parse::<f64>()
            .map_err(|_| BoundError::Unparseable(s.to_string()))?;
        Self::new(secs)
    }
}

impl fmt::Display for MaxDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// One sampled wait, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(into = "f64")]
pub struct Delay(f64);

impl Delay {
    #[must_use]
    pub const fn as_secs_f64(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs_f64(self.0)
    }

    /// Total order over delays; sampled delays are never NaN.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<Delay> for f64 {
    fn from(value: Delay) -> Self {
        value.0
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
