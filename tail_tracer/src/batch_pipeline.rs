use crate::core_modules::background::{BackgroundModel, validate_sensitivity};
use crate::core_modules::boundary_scanner::{BoundaryScanner, BoundaryTrace};
use crate::core_modules::frame::frame::Frame;
use crate::error::{Result, TraceError};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// Outcome of tracing one file in a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub result: Result<BoundaryTrace>,
}

/// Lists the image files directly inside `dir`, sorted by file name.
pub fn collect_images(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Traces many images against one background, decoding and scanning on blocking workers.
pub struct BatchPipeline {
    scanner: Arc<BoundaryScanner>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl BatchPipeline {
    pub fn new(background: BackgroundModel, sensitivity: f64, workers: usize) -> Result<Self> {
        let sensitivity = validate_sensitivity(sensitivity)?;
        if workers == 0 {
            return Err(TraceError::Config {
                message: "batch workers must be at least 1".to_string(),
            });
        }
        Ok(Self {
            scanner: Arc::new(BoundaryScanner::new(background, sensitivity)?),
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Traces every image in `dir`. Results keep file-name order.
    pub async fn trace_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<BatchItem>> {
        let images = collect_images(dir.as_ref())?;
        tracing::info!(
            dir = %dir.as_ref().display(),
            images = images.len(),
            workers = self.workers,
            "starting batch trace"
        );
        Ok(self.trace_all(images).await)
    }

    /// Traces the given files. One failing file does not stop the others.
    pub async fn trace_all(&self, paths: Vec<PathBuf>) -> Vec<BatchItem> {
        let tasks = paths.into_iter().map(|path| {
            let scanner = Arc::clone(&self.scanner);
            let permits = Arc::clone(&self.permits);
            async move {
                let result = Self::trace_one(scanner, permits, path.clone()).await;
                if let Err(e) = &result {
                    tracing::warn!(path = %path.display(), error = %e, "failed to trace image");
                }
                BatchItem { path, result }
            }
        });
        join_all(tasks).await
    }

    async fn trace_one(
        scanner: Arc<BoundaryScanner>,
        permits: Arc<Semaphore>,
        path: PathBuf,
    ) -> Result<BoundaryTrace> {
        let _permit = permits
            .acquire_owned()
            .await
            .map_err(|e| TraceError::Task {
                message: e.to_string(),
            })?;

        tokio::task::spawn_blocking(move || {
            let frame = Frame::open(&path)?;
            Ok::<_, TraceError>(scanner.scan(&frame))
        })
        .await
        .map_err(|e| TraceError::Task {
            message: e.to_string(),
        })?
    }
}
