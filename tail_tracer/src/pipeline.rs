// THEORY:
// The `pipeline` module is the top-level API for a single tracing session. It holds
// the one piece of state that outlives a single call, the sampled blank-space model,
// and wires frames, statistics and the boundary scanner together behind three calls:
//
// 1. `sample_background`: learn what blank space looks like.
// 2. `describe`: report the brightness statistics of any image.
// 3. `record_coordinates`: trace the first foreground pixel of every column.
//
// Callers never touch `Frame`s or `BoundaryScanner`s directly unless they want to.

use crate::config::TracerConfig;
use crate::core_modules::background::BackgroundModel;
use crate::core_modules::boundary_scanner::BoundaryScanner;
use crate::core_modules::frame::frame::Frame;
use crate::error::{Result, TraceError};
use std::path::Path;

// Re-export key data structures for the public API.
pub use crate::core_modules::boundary_scanner::{BoundaryPoint, BoundaryTrace};
pub use crate::core_modules::brightness_stats::BrightnessStats;

/// A single operator's tracing session.
#[derive(Debug, Clone)]
pub struct TracePipeline {
    config: TracerConfig,
    background: Option<BackgroundModel>,
}

impl TracePipeline {
    pub fn new(config: TracerConfig) -> Self {
        Self {
            config,
            background: None,
        }
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    pub fn background(&self) -> Option<&BackgroundModel> {
        self.background.as_ref()
    }

    /// Replaces the background model, e.g. with one sampled elsewhere.
    pub fn set_background(&mut self, background: BackgroundModel) {
        self.background = Some(background);
    }

    /// Brightness statistics of every pixel in the image at `path`.
    pub fn describe(&self, path: impl AsRef<Path>) -> Result<BrightnessStats> {
        Frame::open(path)?.stats()
    }

    /// Samples a blank-space image and keeps its brightness distribution as the background.
    pub fn sample_background(&mut self, path: impl AsRef<Path>) -> Result<BackgroundModel> {
        let path = path.as_ref();
        let background = BackgroundModel::sample(&Frame::open(path)?)?;
        tracing::info!(
            path = %path.display(),
            mean = background.mean,
            std_dev = background.std_dev,
            "background sampled"
        );
        self.background = Some(background);
        Ok(background)
    }

    /// Traces the image at `path` with the configured sensitivity.
    pub fn trace(&self, path: impl AsRef<Path>) -> Result<BoundaryTrace> {
        self.record_coordinates(path, self.config.scan.sensitivity)
    }

    /// Records, per column, the first pixel that deviates from the sampled background by
    /// more than `sensitivity` standard deviations.
    pub fn record_coordinates(
        &self,
        path: impl AsRef<Path>,
        sensitivity: f64,
    ) -> Result<BoundaryTrace> {
        let path = path.as_ref();
        let frame = Frame::open(path)?;
        let trace = self.record_frame(&frame, sensitivity)?;
        tracing::info!(
            path = %path.display(),
            points = trace.points.len(),
            columns = trace.width,
            "boundary traced"
        );
        Ok(trace)
    }

    /// Same as `record_coordinates` for an already decoded frame.
    pub fn record_frame(&self, frame: &Frame, sensitivity: f64) -> Result<BoundaryTrace> {
        let background = self.background.ok_or(TraceError::BackgroundNotSampled)?;
        let scanner = BoundaryScanner::new(background, sensitivity)?;
        Ok(scanner.scan(frame))
    }
}

impl Default for TracePipeline {
    fn default() -> Self {
        Self::new(TracerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    fn write_image(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
        let path = dir.join(name);
        image.save(&path).unwrap();
        path
    }

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([230, 230, 230, 255]))
    }

    /// Dark diagonal "tail" entering from the bottom-left corner.
    fn tail(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if y >= height - 1 - x.min(height - 1) {
                Rgba([40, 30, 25, 255])
            } else {
                Rgba([230, 230, 230, 255])
            }
        })
    }

    #[test]
    fn tracing_before_sampling_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_image(dir.path(), "tail.png", &tail(8, 8));
        let pipeline = TracePipeline::default();
        assert!(matches!(
            pipeline.trace(&image),
            Err(TraceError::BackgroundNotSampled)
        ));
    }

    #[test]
    fn samples_background_then_traces() {
        let dir = tempfile::tempdir().unwrap();
        let background = write_image(dir.path(), "blank.png", &blank(6, 6));
        let image = write_image(dir.path(), "tail.png", &tail(8, 8));

        let mut pipeline = TracePipeline::default();
        let model = pipeline.sample_background(&background).unwrap();
        assert_relative_eq!(model.mean, 230.0, epsilon = 1e-9);
        assert_relative_eq!(model.std_dev, 0.0, epsilon = 1e-9);
        assert_eq!(pipeline.background(), Some(&model));

        let trace = pipeline.trace(&image).unwrap();
        assert_eq!(trace.xs(), (0..8u32).collect::<Vec<_>>());
        assert_eq!(trace.ys(), vec![7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(trace.sensitivity, 2.0);
    }

    #[test]
    fn record_coordinates_honours_explicit_sensitivity() {
        let mut pipeline = TracePipeline::default();
        pipeline.set_background(BackgroundModel::new(230.0, 0.0));

        let frame = Frame::from_image(&tail(4, 4));
        let trace = pipeline.record_frame(&frame, 5.0).unwrap();
        assert_eq!(trace.sensitivity, 5.0);
        assert_eq!(trace.points.len(), 4);

        assert!(matches!(
            pipeline.record_frame(&frame, -2.0),
            Err(TraceError::InvalidSensitivity { .. })
        ));
    }

    #[test]
    fn describe_reports_image_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let half = RgbaImage::from_fn(2, 1, |x, _| {
            let value = if x == 0 { 0 } else { 100 };
            Rgba([value, value, value, 255])
        });
        let path = write_image(dir.path(), "half.png", &half);

        let stats = TracePipeline::default().describe(&path).unwrap();
        assert_eq!(stats.count, 2);
        assert_relative_eq!(stats.mean, 50.0, epsilon = 1e-9);
        // Sample std of {0, 100} is sqrt(5000).
        assert_relative_eq!(stats.std_dev, 5000f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn missing_image_surfaces_an_image_error() {
        let mut pipeline = TracePipeline::default();
        assert!(matches!(
            pipeline.sample_background("missing/blank.png"),
            Err(TraceError::Image { .. })
        ));
        assert!(pipeline.background().is_none());
    }
}
