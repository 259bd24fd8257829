//! Data Preparation Stage Library
//!
//! Prepares a tabular dataset for model training, built with Rust and Polars.
//!
//! # Overview
//!
//! A run goes through four stages:
//!
//! - **Loading**: read the source CSV (with fallbacks for sloppy quoting)
//! - **Outlier Handling**: replace IQR outliers of one numeric column with its median
//! - **Splitting**: seeded, reproducible train/test partition of features and labels
//! - **Persisting**: write `X_train`, `X_test`, `y_train`, `y_test` as Parquet
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use iris_prep::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("artifacts/raw/data.csv")
//!     .output_dir("artifacts/processed")
//!     .outlier_column("SepalWidthCm")
//!     .test_fraction(0.2)
//!     .seed(42)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("Replaced {} outliers", result.outliers.values_replaced);
//! ```
//!
//! # Using the stages directly
//!
//! ```rust,ignore
//! use iris_prep::{DatasetSplitter, OutlierSanitizer};
//!
//! let report = OutlierSanitizer::sanitize(&mut df, "SepalWidthCm")?;
//! let split = DatasetSplitter::split(&features, &labels, 0.2, 42)?;
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod persist;
pub mod pipeline;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use dataset::{feature_matrix, label_vector, load_csv, require_columns};
pub use error::{ErrorKind, PrepError, Result as PrepResult, ResultExt};
pub use persist::{ArtifactWriter, read_artifact};
pub use pipeline::{
    ClosureProgressReporter, DatasetSplitter, OutlierSanitizer, Pipeline, PipelineBuilder,
    PipelineStage, ProgressReporter, ProgressUpdate, StageStatus,
};
pub use types::{
    ArtifactPaths, OutlierBounds, OutlierReport, PipelineResult, SplitIndices, SplitResult,
};
