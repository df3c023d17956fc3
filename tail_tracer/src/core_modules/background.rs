// THEORY:
// The `BackgroundModel` is the tracer's memory of what "blank space" looks like. It is
// learned once from a sample image that contains nothing but background, and reduced
// to a mean brightness and a spread. Every later decision is a question put to this
// model: is this brightness still plausibly background, or has it left the band?
//
// The band is symmetric, mean ± std_dev · sensitivity. A pixel deviates only when it
// falls strictly outside the band, so a perfectly uniform background (std_dev = 0)
// still accepts pixels exactly equal to the mean.

use crate::core_modules::brightness_stats::BrightnessStats;
use crate::core_modules::frame::frame::Frame;
use crate::error::{Result, TraceError};

pub const DEFAULT_SENSITIVITY: f64 = 2.0;

/// The expected brightness distribution of blank space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundModel {
    pub mean: f64,
    pub std_dev: f64,
}

impl BackgroundModel {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Learns the model from a frame that contains only background.
    pub fn sample(frame: &Frame) -> Result<Self> {
        let stats = frame.stats()?;
        tracing::debug!(
            mean = stats.mean,
            std_dev = stats.std_dev,
            pixels = stats.count,
            "sampled blank space"
        );
        Ok(Self::from(stats))
    }

    /// The (lower, upper) brightness limits still considered background.
    pub fn band(&self, sensitivity: f64) -> (f64, f64) {
        let spread = self.std_dev * sensitivity;
        (self.mean - spread, self.mean + spread)
    }

    /// True when `brightness` lies strictly outside the band for `sensitivity`.
    pub fn deviates(&self, brightness: f64, sensitivity: f64) -> bool {
        let (lower, upper) = self.band(sensitivity);
        brightness > upper || brightness < lower
    }
}

impl From<BrightnessStats> for BackgroundModel {
    fn from(stats: BrightnessStats) -> Self {
        Self::new(stats.mean, stats.std_dev)
    }
}

pub fn validate_sensitivity(sensitivity: f64) -> Result<f64> {
    if sensitivity.is_finite() && sensitivity >= 0.0 {
        Ok(sensitivity)
    } else {
        Err(TraceError::InvalidSensitivity { value: sensitivity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn band_is_symmetric_around_mean() {
        let model = BackgroundModel::new(100.0, 5.0);
        let (lower, upper) = model.band(2.0);
        assert_relative_eq!(lower, 90.0);
        assert_relative_eq!(upper, 110.0);
    }

    #[test]
    fn band_edges_are_not_deviations() {
        let model = BackgroundModel::new(100.0, 5.0);
        assert!(!model.deviates(110.0, 2.0));
        assert!(!model.deviates(90.0, 2.0));
        assert!(model.deviates(110.0001, 2.0));
        assert!(model.deviates(89.9999, 2.0));
    }

    #[test]
    fn higher_sensitivity_widens_the_band() {
        let model = BackgroundModel::new(100.0, 5.0);
        assert!(model.deviates(115.0, 2.0));
        assert!(!model.deviates(115.0, 3.0));
    }

    #[test]
    fn uniform_background_accepts_only_its_mean() {
        let model = BackgroundModel::new(200.0, 0.0);
        assert!(!model.deviates(200.0, 4.0));
        assert!(model.deviates(200.5, 4.0));
        assert!(model.deviates(199.5, 4.0));
    }

    #[test]
    fn sampled_from_uniform_frame() {
        let frame = Frame::from_rgba(2, 2, &[50u8; 16]).unwrap();
        let model = BackgroundModel::sample(&frame).unwrap();
        assert_relative_eq!(model.mean, 50.0, epsilon = 1e-9);
        assert_relative_eq!(model.std_dev, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn sensitivity_validation() {
        assert_eq!(validate_sensitivity(0.0).unwrap(), 0.0);
        assert_eq!(validate_sensitivity(2.5).unwrap(), 2.5);
        assert!(validate_sensitivity(-1.0).is_err());
        assert!(validate_sensitivity(f64::NAN).is_err());
        assert!(validate_sensitivity(f64::INFINITY).is_err());
    }
}
