use crate::core_modules::background::{DEFAULT_SENSITIVITY, validate_sensitivity};
use crate::error::{Result, TraceError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration, loadable from a TOML file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    pub scan: ScanConfig,
    pub plot: PlotConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Standard deviations from the background mean before a pixel counts as foreground.
    /// Uniform backgrounds need a higher value.
    pub sensitivity: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("tail_trace.png"),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of images decoded and scanned at once.
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
        }
    }
}

impl TracerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TracerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| TraceError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&contents)
    }

    /// Loads `path` when given, otherwise falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_sensitivity(self.scan.sensitivity)?;

        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(TraceError::Config {
                message: format!(
                    "plot size must be non-zero, got {}x{}",
                    self.plot.width, self.plot.height
                ),
            });
        }

        if self.plot.output.as_os_str().is_empty() {
            return Err(TraceError::Config {
                message: "plot output path cannot be empty".to_string(),
            });
        }

        if self.batch.workers == 0 {
            return Err(TraceError::Config {
                message: "batch workers must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = TracerConfig::from_toml_str("").unwrap();
        assert_eq!(config, TracerConfig::default());
        assert_eq!(config.scan.sensitivity, 2.0);
        assert_eq!(config.plot.output, PathBuf::from("tail_trace.png"));
        assert!(config.batch.workers >= 1);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = TracerConfig::from_toml_str(
            r#"
            [scan]
            sensitivity = 3.5

            [plot]
            output = "plots/tail.png"
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.sensitivity, 3.5);
        assert_eq!(config.plot.output, PathBuf::from("plots/tail.png"));
        assert_eq!(config.plot.width, 1024);
        assert_eq!(config.plot.height, 768);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(TracerConfig::from_toml_str("[scan]\nsensitivity = -1.0").is_err());
        assert!(TracerConfig::from_toml_str("[plot]\nwidth = 0").is_err());
        assert!(TracerConfig::from_toml_str("[batch]\nworkers = 0").is_err());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = TracerConfig::from_toml_str("[scan\nsensitivity = ").unwrap_err();
        assert!(matches!(err, TraceError::Config { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracer.toml");
        std::fs::write(&path, "[batch]\nworkers = 3\n").unwrap();

        let config = TracerConfig::load_or_default(Some(path.as_path())).unwrap();
        assert_eq!(config.batch.workers, 3);

        let missing = TracerConfig::load(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(TraceError::Config { .. })));
    }
}
