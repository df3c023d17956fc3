// THEORY:
// `brightness_stats` turns a stream of brightness values into the two numbers the
// rest of the tracer reasons with: a mean and a sample standard deviation. Images can
// be large, so the estimator never stores the values. It keeps a running count, mean
// and sum of squared deviations (Welford's update), which is numerically stable and
// needs only one pass over the pixels.
//
// Partial accumulators can be merged, so a caller that splits an image into pieces can
// combine the pieces' results without revisiting any pixel.

use crate::error::{Result, TraceError};

/// Summary of a brightness distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessStats {
    /// The arithmetic mean brightness.
    pub mean: f64,
    /// The sample standard deviation (divides by `count - 1`).
    pub std_dev: f64,
    /// How many values were observed.
    pub count: u64,
}

impl BrightnessStats {
    /// Computes statistics over any stream of brightness values.
    pub fn from_values<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut accumulator = BrightnessAccumulator::new();
        accumulator.extend(values);
        accumulator.finish()
    }
}

/// Streaming mean / standard deviation estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrightnessAccumulator {
    count: u64,
    mean: f64,
    sum_squared_deviation: f64,
}

impl BrightnessAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_squared_deviation += delta * (value - self.mean);
    }

    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = f64>,
    {
        for value in values {
            self.push(value);
        }
    }

    /// Folds another partial accumulator into this one.
    pub fn merge(&mut self, other: &BrightnessAccumulator) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }

        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        let weight = (self.count as f64 * other.count as f64) / total as f64;

        self.mean += delta * other.count as f64 / total as f64;
        self.sum_squared_deviation += other.sum_squared_deviation + delta * delta * weight;
        self.count = total;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn finish(&self) -> Result<BrightnessStats> {
        match self.count {
            0 => Err(TraceError::EmptySample),
            1 => Ok(BrightnessStats {
                mean: self.mean,
                std_dev: 0.0,
                count: 1,
            }),
            count => {
                let variance = (self.sum_squared_deviation / (count - 1) as f64).max(0.0);
                Ok(BrightnessStats {
                    mean: self.mean,
                    std_dev: variance.sqrt(),
                    count,
                })
            }
        }
    }
}
