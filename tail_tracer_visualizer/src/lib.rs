use anyhow::Context;
use image::{Rgba, RgbaImage};
use plotters::prelude::*;
use std::path::Path;
use tail_tracer::BoundaryTrace;

#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    pub caption: Option<String>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            caption: None,
        }
    }
}

/// Color used to mark boundary points on overlays.
pub const MARKER: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Axis extents for a trace: the image dimensions, never collapsed to an empty range.
pub fn axis_ranges(trace: &BoundaryTrace) -> ((f64, f64), (f64, f64)) {
    let x_max = trace.width.max(1) as f64;
    let y_max = trace.height.max(1) as f64;
    ((0.0, x_max), (0.0, y_max))
}

/// Plots `y position` against `x position` for every boundary point and writes a PNG.
pub fn plot_trace(trace: &BoundaryTrace, output: &Path, options: &PlotOptions) -> anyhow::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating plot directory {}", parent.display()))?;
    }

    let root = BitMapBackend::new(output, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let ((x_min, x_max), (y_min, y_max)) = axis_ranges(trace);
    let caption = options
        .caption
        .clone()
        .unwrap_or_else(|| format!("Tail boundary (sensitivity {:.2})", trace.sensitivity));

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("x position")
        .y_desc("y position")
        .draw()?;

    let points: Vec<(f64, f64)> = trace
        .points
        .iter()
        .map(|p| (p.x as f64, p.y as f64))
        .collect();

    chart.draw_series(LineSeries::new(points, &BLUE))?;

    root.present()
        .with_context(|| format!("writing plot {}", output.display()))?;
    tracing::info!(path = %output.display(), points = trace.points.len(), "plot written");
    Ok(())
}

/// Paints every boundary point onto a copy of `image`.
pub fn overlay_trace(image: &RgbaImage, trace: &BoundaryTrace) -> RgbaImage {
    let mut overlay = image.clone();
    for point in &trace.points {
        if point.x < overlay.width() && point.y < overlay.height() {
            overlay.put_pixel(point.x, point.y, MARKER);
        }
    }
    overlay
}

/// Loads the traced image from `source`, marks the trace on it and saves it to `output`.
pub fn draw_overlay(source: &Path, trace: &BoundaryTrace, output: &Path) -> anyhow::Result<()> {
    let image = image::open(source)
        .with_context(|| format!("opening {}", source.display()))?
        .to_rgba8();
    overlay_trace(&image, trace)
        .save(output)
        .with_context(|| format!("saving overlay {}", output.display()))?;
    tracing::info!(path = %output.display(), "overlay written");
    Ok(())
}
