//! Pipeline module.
//!
//! This module provides the preparation pipeline and the two stages with
//! real numeric semantics: outlier sanitizing and train/test splitting.

mod builder;
pub mod outliers;
pub mod progress;
pub mod split;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::OutlierSanitizer;
pub use progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate, StageStatus,
};
pub use split::DatasetSplitter;
