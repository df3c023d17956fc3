// THEORY:
// This file is the entry point for the `tail_tracer` library crate. It exposes the
// tracing session (`TracePipeline`), the directory batch runner (`BatchPipeline`),
// configuration and errors as the public API. The building blocks under
// `core_modules` (pixel brightness, streaming statistics, frames, the background
// model and the column scanner) stay public for callers that want to drive a scan
// by hand, but most users only need `pipeline`.

pub mod batch_pipeline;
pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::TracerConfig;
pub use core_modules::background::BackgroundModel;
pub use error::{Result, TraceError};
pub use pipeline::{BoundaryPoint, BoundaryTrace, BrightnessStats, TracePipeline};
