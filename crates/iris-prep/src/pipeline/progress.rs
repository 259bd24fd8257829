//! Stage reporting for the preparation pipeline.
//!
//! The pipeline never logs through a global sink of its own choosing beyond
//! `tracing`; callers that want stage events inject a [`ProgressReporter`]
//! and receive a [`ProgressUpdate`] at the start, success, or failure of
//! each stage.
//!
//! # Example
//!
//! ```rust,ignore
//! use iris_prep::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .run();
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the preparation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the source CSV
    Loading,
    /// Replacing outliers in the configured column
    OutlierHandling,
    /// Partitioning rows into train and test sets
    Splitting,
    /// Writing the split artifacts
    Persisting,
    /// Pipeline completed successfully
    Complete,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::OutlierHandling => "Handling Outliers",
            Self::Splitting => "Splitting Data",
            Self::Persisting => "Persisting Artifacts",
            Self::Complete => "Complete",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.30,
            Self::OutlierHandling => 0.20,
            Self::Splitting => 0.20,
            Self::Persisting => 0.30,
            Self::Complete => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::OutlierHandling => 0.30,
            Self::Splitting => 0.50,
            Self::Persisting => 0.70,
            Self::Complete => 1.0,
        }
    }
}

/// Where a stage is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Started,
    Completed,
    Failed,
}

/// A single stage boundary event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Pipeline stage this event belongs to
    pub stage: PipelineStage,

    /// Start, success, or failure of the stage
    pub status: StageStatus,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing the event
    pub message: String,
}

impl ProgressUpdate {
    /// A stage is about to run.
    pub fn started(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Started,
            progress: stage.base_progress().clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// A stage finished successfully.
    pub fn completed(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Completed,
            progress: (stage.base_progress() + stage.weight()).clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// A stage failed; `message` carries the error.
    pub fn failed(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Failed,
            progress: stage.base_progress().clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// The whole run completed.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::completed(PipelineStage::Complete, message)
    }
}

/// Receiver for stage events.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
///
/// ```rust,ignore
/// use iris_prep::{ProgressReporter, ProgressUpdate};
///
/// struct StderrReporter;
///
/// impl ProgressReporter for StderrReporter {
///     fn report(&self, update: ProgressUpdate) {
///         eprintln!("{}: {}", update.stage.display_name(), update.message);
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Called at each stage boundary.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
