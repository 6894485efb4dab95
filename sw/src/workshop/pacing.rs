//! Simulated delays and the speed multiplier

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Inclusive range of delays in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    #[serde(rename = "min-ms")]
    pub min_ms: u64,
    #[serde(rename = "max-ms")]
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields `ms`
    pub const fn fixed(ms: u64) -> Self {
        Self { min_ms: ms, max_ms: ms }
    }

    /// Swap inverted bounds
    pub fn normalized(self) -> Self {
        if self.min_ms > self.max_ms {
            warn!(min_ms = self.min_ms, max_ms = self.max_ms, "DelayRange: inverted bounds, swapping");
            Self::new(self.max_ms, self.min_ms)
        } else {
            self
        }
    }
}

impl fmt::Display for DelayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] ms", self.min_ms, self.max_ms)
    }
}

/// Source of the raw millisecond draw for a delay
pub trait DelaySampler: Send + Sync {
    /// Pick a value in `range.min_ms..=range.max_ms`
    fn sample(&self, range: DelayRange) -> u64;
}

/// Uniform draw from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSampler;

impl DelaySampler for RandomSampler {
    fn sample(&self, range: DelayRange) -> u64 {
        let range = range.normalized();
        rand::rng().random_range(range.min_ms..=range.max_ms)
    }
}

/// Always returns the same draw, clamped into the range
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler(pub u64);

impl DelaySampler for FixedSampler {
    fn sample(&self, range: DelayRange) -> u64 {
        let range = range.normalized();
        self.0.clamp(range.min_ms, range.max_ms)
    }
}

/// Map a requested speed onto a usable divisor
///
/// Zero, negative and non-finite values mean "no scaling".
pub fn normalize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 { speed } else { 1.0 }
}

/// Scale a millisecond count by the speed divisor
pub fn scale_delay(ms: u64, speed: f64) -> Duration {
    let speed = normalize_speed(speed);
    let nanos = (ms as f64 * 1_000_000.0 / speed).round();
    if nanos >= u64::MAX as f64 {
        Duration::from_nanos(u64::MAX)
    } else {
        Duration::from_nanos(nanos as u64)
    }
}

/// Turns delay ranges into sleeps, honouring the live speed multiplier
pub struct Pacer {
    speed_bits: AtomicU64,
    sampler: Box<dyn DelaySampler>,
}

impl Pacer {
    pub fn new(speed: f64, sampler: Box<dyn DelaySampler>) -> Self {
        Self {
            speed_bits: AtomicU64::new(normalize_speed(speed).to_bits()),
            sampler,
        }
    }

    /// Store a new multiplier and return the value actually applied
    pub fn set_speed(&self, speed: f64) -> f64 {
        let applied = normalize_speed(speed);
        if applied != speed {
            warn!(requested = speed, applied, "Pacer::set_speed: non-positive speed, using default");
        }
        self.speed_bits.store(applied.to_bits(), Ordering::Relaxed);
        applied
    }

    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed_bits.load(Ordering::Relaxed))
    }

    /// Draw a delay from `range` and scale it
    pub fn draw(&self, range: DelayRange) -> Duration {
        let ms = self.sampler.sample(range);
        let delay = scale_delay(ms, self.speed());
        debug!(%range, ms, ?delay, "Pacer::draw");
        delay
    }

    /// Sleep for a random draw from `range`
    pub async fn pause(&self, range: DelayRange) {
        tokio::time::sleep(self.draw(range)).await;
    }

    /// Sleep for exactly `ms`, scaled
    pub async fn pause_fixed(&self, ms: u64) {
        tokio::time::sleep(scale_delay(ms, self.speed())).await;
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(1.0, Box::new(RandomSampler))
    }
}
