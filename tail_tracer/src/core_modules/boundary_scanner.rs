// THEORY:
// The `BoundaryScanner` is where the tracer actually finds the silhouette. It walks the
// frame one column at a time, left to right, and within each column reads pixels top to
// bottom. The first pixel whose brightness leaves the background band marks the upper
// edge of the foreground in that column; the scan records (x, y) and moves on to the
// next column without looking further down.
//
// Columns that never leave the band contribute nothing. The resulting `BoundaryTrace`
// is therefore a partial function of x: ordered by column, at most one point per
// column, possibly empty.

use crate::core_modules::background::{BackgroundModel, validate_sensitivity};
use crate::core_modules::frame::frame::Frame;
use crate::error::Result;
use std::collections::HashSet;

/// The first deviating pixel found in one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub x: u32,
    pub y: u32,
}

/// Per-column boundary coordinates for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryTrace {
    /// Width of the scanned frame, i.e. the number of columns examined.
    pub width: u32,
    /// Height of the scanned frame.
    pub height: u32,
    /// The sensitivity (standard deviations) the scan ran with.
    pub sensitivity: f64,
    /// One point per column that left the background band, ordered by `x`.
    pub points: Vec<BoundaryPoint>,
}

impl BoundaryTrace {
    pub fn xs(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fraction of columns that produced a boundary point.
    pub fn coverage(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        self.points.len() as f64 / self.width as f64
    }

    /// Columns in which no pixel left the background band.
    pub fn missing_columns(&self) -> Vec<u32> {
        let found: HashSet<u32> = self.points.iter().map(|p| p.x).collect();
        (0..self.width).filter(|x| !found.contains(x)).collect()
    }
}

/// Scans frames against a fixed background model.
pub struct BoundaryScanner {
    background: BackgroundModel,
    sensitivity: f64,
}

impl BoundaryScanner {
    pub fn new(background: BackgroundModel, sensitivity: f64) -> Result<Self> {
        Ok(Self {
            background,
            sensitivity: validate_sensitivity(sensitivity)?,
        })
    }

    pub fn background(&self) -> &BackgroundModel {
        &self.background
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Returns the row of the first deviating pixel in column `x`, if any.
    pub fn scan_column(&self, frame: &Frame, x: u32) -> Option<u32> {
        frame
            .column_brightness(x)
            .position(|brightness| self.background.deviates(brightness, self.sensitivity))
            .map(|y| y as u32)
    }

    pub fn scan(&self, frame: &Frame) -> BoundaryTrace {
        let (lower, upper) = self.background.band(self.sensitivity);
        tracing::debug!(
            lower,
            upper,
            first_pixel = ?frame.pixel(0, 0).map(|p| p.brightness()),
            "scanning columns against background band"
        );

        let points: Vec<BoundaryPoint> = (0..frame.width)
            .filter_map(|x| self.scan_column(frame, x).map(|y| BoundaryPoint { x, y }))
            .collect();

        tracing::debug!(
            columns = frame.width,
            found = points.len(),
            "column scan complete"
        );

        BoundaryTrace {
            width: frame.width,
            height: frame.height,
            sensitivity: self.sensitivity,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const BACKGROUND: u8 = 200;
    const TAIL: u8 = 20;

    /// A plain background with a dark shape whose top edge in column `x` is `edges[x]`.
    fn silhouette(edges: &[Option<u32>], height: u32) -> Frame {
        let image = RgbaImage::from_fn(edges.len() as u32, height, |x, y| {
            let value = match edges[x as usize] {
                Some(edge) if y >= edge => TAIL,
                _ => BACKGROUND,
            };
            Rgba([value, value, value, 255])
        });
        Frame::from_image(&image)
    }

    fn background_model() -> BackgroundModel {
        let blank = silhouette(&[None; 4], 4);
        BackgroundModel::sample(&blank).unwrap()
    }

    #[test]
    fn finds_first_deviating_row_per_column() {
        let frame = silhouette(&[Some(5), Some(3), Some(0), Some(7)], 8);
        let scanner = BoundaryScanner::new(background_model(), 2.0).unwrap();
        let trace = scanner.scan(&frame);

        assert_eq!(trace.xs(), vec![0, 1, 2, 3]);
        assert_eq!(trace.ys(), vec![5, 3, 0, 7]);
        assert_eq!(trace.coverage(), 1.0);
        assert!(trace.missing_columns().is_empty());
    }

    #[test]
    fn columns_without_deviation_are_skipped() {
        let frame = silhouette(&[None, Some(2), None, Some(4), None], 6);
        let scanner = BoundaryScanner::new(background_model(), 2.0).unwrap();
        let trace = scanner.scan(&frame);

        assert_eq!(
            trace.points,
            vec![BoundaryPoint { x: 1, y: 2 }, BoundaryPoint { x: 3, y: 4 }]
        );
        assert_eq!(trace.missing_columns(), vec![0, 2, 4]);
        assert!((trace.coverage() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn blank_frame_yields_empty_trace() {
        let frame = silhouette(&[None; 6], 6);
        let scanner = BoundaryScanner::new(background_model(), 1.0).unwrap();
        let trace = scanner.scan(&frame);
        assert!(trace.is_empty());
        assert_eq!(trace.width, 6);
        assert_eq!(trace.height, 6);
    }

    #[test]
    fn brighter_than_background_also_deviates() {
        let image = RgbaImage::from_fn(2, 4, |x, y| {
            let value = if x == 1 && y == 2 { 255 } else { BACKGROUND };
            Rgba([value, value, value, 255])
        });
        let scanner = BoundaryScanner::new(background_model(), 2.0).unwrap();
        let trace = scanner.scan(&Frame::from_image(&image));
        assert_eq!(trace.points, vec![BoundaryPoint { x: 1, y: 2 }]);
    }

    #[test]
    fn sensitivity_controls_what_counts_as_foreground() {
        // Background 100 ± 10, a faint smudge at 125 and a solid shape at 20 below it.
        let background = BackgroundModel::new(100.0, 10.0);
        let image = RgbaImage::from_fn(1, 6, |_, y| {
            let value = match y {
                0 | 1 => 100,
                2 => 125,
                _ => 20,
            };
            Rgba([value, value, value, 255])
        });
        let frame = Frame::from_image(&image);

        let sensitive = BoundaryScanner::new(background, 2.0).unwrap();
        assert_eq!(sensitive.scan_column(&frame, 0), Some(2));

        let tolerant = BoundaryScanner::new(background, 3.0).unwrap();
        assert_eq!(tolerant.scan_column(&frame, 0), Some(3));
    }

    #[test]
    fn rejects_invalid_sensitivity() {
        assert!(BoundaryScanner::new(background_model(), -0.5).is_err());
        assert!(BoundaryScanner::new(background_model(), f64::NAN).is_err());
    }

    #[test]
    fn missing_columns_ignore_point_order() {
        let trace = BoundaryTrace {
            width: 5,
            height: 4,
            sensitivity: 2.0,
            points: vec![
                BoundaryPoint { x: 3, y: 1 },
                BoundaryPoint { x: 0, y: 2 },
                BoundaryPoint { x: 3, y: 0 },
            ],
        };
        assert_eq!(trace.missing_columns(), vec![1, 2, 4]);
    }

    #[test]
    fn empty_frame_has_no_coverage() {
        let frame = Frame::from_rgba(0, 0, &[]).unwrap();
        let scanner = BoundaryScanner::new(background_model(), 2.0).unwrap();
        let trace = scanner.scan(&frame);
        assert!(trace.is_empty());
        assert_eq!(trace.coverage(), 0.0);
    }
}
