//! Configuration types for the data preparation pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default source CSV path.
pub const DEFAULT_INPUT_PATH: &str = "artifacts/raw/data.csv";

/// Default directory for the persisted train/test artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "artifacts/processed";

/// Default column sanitized for outliers.
pub const DEFAULT_OUTLIER_COLUMN: &str = "SepalWidthCm";

/// Default feature columns, in output order.
pub const DEFAULT_FEATURE_COLUMNS: [&str; 4] = [
    "SepalLengthCm",
    "SepalWidthCm",
    "PetalLengthCm",
    "PetalWidthCm",
];

/// Default label column.
pub const DEFAULT_LABEL_COLUMN: &str = "Species";

/// Default fraction of rows held out for testing.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default shuffle seed.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for the preparation pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use iris_prep::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .input_path("data/iris.csv")
///     .output_dir("out")
///     .test_fraction(0.25)
///     .seed(7)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path of the source CSV file.
    /// Default: "artifacts/raw/data.csv"
    pub input_path: PathBuf,

    /// Directory the four split artifacts are written to (created if absent).
    /// Default: "artifacts/processed"
    pub output_dir: PathBuf,

    /// Numeric column whose outliers are replaced with its median.
    /// Default: "SepalWidthCm"
    pub outlier_column: String,

    /// Columns forming the feature matrix.
    /// Default: the four Iris measurement columns
    pub feature_columns: Vec<String>,

    /// Column forming the label vector.
    /// Default: "Species"
    pub label_column: String,

    /// Fraction of rows assigned to the test set, exclusive range (0, 1).
    /// Default: 0.2
    pub test_fraction: f64,

    /// Seed for the row shuffle.
    /// Default: 42
    pub seed: u64,

    /// Whether to write a JSON run report next to the artifacts.
    /// Default: false
    pub write_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            outlier_column: DEFAULT_OUTLIER_COLUMN.to_string(),
            feature_columns: DEFAULT_FEATURE_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            write_report: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Every column the pipeline reads: features followed by the label.
    pub fn required_columns(&self) -> Vec<String> {
        let mut columns = self.feature_columns.clone();
        columns.push(self.label_column.clone());
        columns
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigValidationError::InvalidTestFraction(
                self.test_fraction,
            ));
        }

        if self.feature_columns.is_empty() {
            return Err(ConfigValidationError::NoFeatureColumns);
        }

        if self.outlier_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("outlier_column"));
        }

        if self.label_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("label_column"));
        }

        if self.feature_columns.contains(&self.label_column) {
            return Err(ConfigValidationError::LabelIsFeature(
                self.label_column.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid test fraction: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestFraction(f64),

    #[error("At least one feature column is required")]
    NoFeatureColumns,

    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(&'static str),

    #[error("Label column '{0}' is also listed as a feature")]
    LabelIsFeature(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    outlier_column: Option<String>,
    feature_columns: Option<Vec<String>>,
    label_column: Option<String>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
    write_report: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the source CSV path.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the directory for the split artifacts.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the column to sanitize for outliers.
    pub fn outlier_column(mut self, column: impl Into<String>) -> Self {
        self.outlier_column = Some(column.into());
        self
    }

    /// Set the feature columns.
    pub fn feature_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the label column.
    pub fn label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    /// Set the test fraction.
    ///
    /// # Arguments
    /// * `fraction` - Value strictly between 0.0 and 1.0 (e.g., 0.2 = 20% test rows)
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = Some(fraction);
        self
    }

    /// Set the shuffle seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable the JSON run report.
    pub fn write_report(mut self, write: bool) -> Self {
        self.write_report = Some(write);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            outlier_column: self.outlier_column.unwrap_or(defaults.outlier_column),
            feature_columns: self.feature_columns.unwrap_or(defaults.feature_columns),
            label_column: self.label_column.unwrap_or(defaults.label_column),
            test_fraction: self.test_fraction.unwrap_or(defaults.test_fraction),
            seed: self.seed.unwrap_or(defaults.seed),
            write_report: self.write_report.unwrap_or(defaults.write_report),
        };

        config.validate()?;
        Ok(config)
    }
}
