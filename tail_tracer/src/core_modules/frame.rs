// THEORY:
// A `Frame` is a decoded image held as a flat, row-major grid of `Pixel`s. Like the
// `Pixel` it is built from, it is a data container: it knows its own dimensions and
// how to hand out brightness values in the two orders the tracer needs (every pixel
// for statistics, one column top-to-bottom for boundary scanning). It does not know
// what a background is.
//
// Decoding is delegated entirely to the `image` crate. Whatever the source format,
// the frame is converted to RGBA8 before any brightness is computed, so statistics
// and scans always read the same pixels.

pub mod frame {
    use crate::core_modules::brightness_stats::BrightnessStats;
    use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
    use crate::error::{Result, TraceError};
    use image::RgbaImage;
    use std::path::Path;

    /// A decoded image as a row-major grid of pixels.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Frame {
        /// The width of the frame in pixels.
        pub width: u32,
        /// The height of the frame in pixels.
        pub height: u32,
        /// A flattened, row-major vector of every pixel in the frame.
        pub pixels: Vec<Pixel>,
    }

    impl Frame {
        /// Decodes an image from disk. Any format the `image` crate understands is accepted.
        pub fn open(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref();
            let decoded = image::open(path).map_err(|source| TraceError::Image {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(
                path = %path.display(),
                width = decoded.width(),
                height = decoded.height(),
                "decoded image"
            );
            Ok(Self::from_image(&decoded.to_rgba8()))
        }

        pub fn from_image(image: &RgbaImage) -> Self {
            Self {
                width: image.width(),
                height: image.height(),
                pixels: image.pixels().map(|rgba| Pixel::from(*rgba)).collect(),
            }
        }

        /// Builds a frame from a raw RGBA buffer, checking that its length matches the dimensions.
        pub fn from_rgba(width: u32, height: u32, buffer: &[u8]) -> Result<Self> {
            let expected = (width as usize)
                .checked_mul(height as usize)
                .and_then(|pixels| pixels.checked_mul(CHANNELS))
                .ok_or_else(|| TraceError::InvalidBuffer {
                    message: format!("{}x{} RGBA frame is too large", width, height),
                })?;
            if buffer.len() != expected {
                return Err(TraceError::InvalidBuffer {
                    message: format!(
                        "{}x{} RGBA frame needs {} bytes, got {}",
                        width,
                        height,
                        expected,
                        buffer.len()
                    ),
                });
            }

            let pixels = buffer
                .chunks_exact(CHANNELS)
                .map(Pixel::try_from)
                .collect::<Result<Vec<_>>>()?;

            Ok(Self {
                width,
                height,
                pixels,
            })
        }

        pub fn is_empty(&self) -> bool {
            self.pixels.is_empty()
        }

        pub fn pixel(&self, x: u32, y: u32) -> Option<&Pixel> {
            if x >= self.width || y >= self.height {
                return None;
            }
            self.pixels.get(y as usize * self.width as usize + x as usize)
        }

        /// Brightness of every pixel in row-major order.
        pub fn brightness_values(&self) -> impl Iterator<Item = f64> + '_ {
            self.pixels.iter().map(Pixel::brightness)
        }

        /// Brightness of one column, top to bottom. Empty if `x` is out of range.
        pub fn column_brightness(&self, x: u32) -> impl Iterator<Item = f64> + '_ {
            let width = self.width as usize;
            let start = x as usize;
            let rows = if x < self.width { self.height as usize } else { 0 };
            self.pixels
                .iter()
                .skip(start)
                .step_by(width.max(1))
                .take(rows)
                .map(Pixel::brightness)
        }

        /// Mean and sample standard deviation of every pixel's brightness.
        pub fn stats(&self) -> Result<BrightnessStats> {
            BrightnessStats::from_values(self.brightness_values())
        }
    }
}
