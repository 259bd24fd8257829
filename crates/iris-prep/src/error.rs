//! Error types for the data preparation pipeline.
//!
//! Every failure is surfaced as a single [`PrepError`] that carries a kind
//! tag ([`ErrorKind`]), the pipeline stage it happened in (once wrapped by the
//! pipeline) and the underlying cause.
//!
//! Errors are serializable so a caller can forward them as `{code, kind, message}`.

use crate::pipeline::PipelineStage;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Source file missing, unreadable or malformed.
    Load,
    /// A required column is missing, has the wrong type, or inputs disagree.
    Precondition,
    /// Writing an artifact failed.
    Persist,
    /// Anything else (library errors outside a known stage).
    Internal,
}

/// The main error type for the preparation pipeline.
#[derive(Error, Debug)]
pub enum PrepError {
    /// The source dataset could not be loaded.
    #[error("Failed to load data from '{}': {reason}", .path.display())]
    LoadFailed { path: PathBuf, reason: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// One or more required columns are absent.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Column exists but does not hold numeric values.
    #[error("Column '{column}' is not numeric (dtype: {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    /// Features and labels disagree on the number of rows.
    #[error("Row count mismatch: features have {features} rows, labels have {labels}")]
    RowCountMismatch { features: usize, labels: usize },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An artifact could not be written.
    #[error("Failed to persist '{}': {reason}", .path.display())]
    PersistFailed { path: PathBuf, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure attributed to a pipeline stage.
    #[error("{} stage failed: {source}", .stage.display_name())]
    StageFailed {
        stage: PipelineStage,
        #[source]
        source: Box<PrepError>,
    },

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Attribute this error to a pipeline stage.
    ///
    /// Already-attributed errors are returned unchanged.
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        match self {
            Self::StageFailed { .. } => self,
            other => PrepError::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The kind of failure, looking through stage and context wrappers.
    ///
    /// Library errors (IO, Polars, JSON) take the kind of the stage they
    /// were raised in: loading maps to `Load`, persisting to `Persist`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LoadFailed { .. } => ErrorKind::Load,
            Self::ColumnNotFound(_)
            | Self::MissingColumns(_)
            | Self::NonNumericColumn { .. }
            | Self::RowCountMismatch { .. }
            | Self::InvalidConfig(_) => ErrorKind::Precondition,
            Self::PersistFailed { .. } => ErrorKind::Persist,
            Self::Io(_) | Self::Polars(_) | Self::Json(_) => ErrorKind::Internal,
            Self::StageFailed { stage, source } => match (source.kind(), stage) {
                (ErrorKind::Internal, PipelineStage::Loading) => ErrorKind::Load,
                (ErrorKind::Internal, PipelineStage::Persisting) => ErrorKind::Persist,
                (kind, _) => kind,
            },
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// The stage this error was attributed to, if any.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            Self::WithContext { source, .. } => source.stage(),
            _ => None,
        }
    }

    /// Get a stable error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LoadFailed { .. } => "LOAD_FAILED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::NonNumericColumn { .. } => "NON_NUMERIC_COLUMN",
            Self::RowCountMismatch { .. } => "ROW_COUNT_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::PersistFailed { .. } => "PERSIST_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::StageFailed { source, .. } => source.error_code(),
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a precondition failure.
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }
}

impl From<crate::config::ConfigValidationError> for PrepError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        PrepError::InvalidConfig(err.to_string())
    }
}

impl Serialize for PrepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PrepError", 4)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("stage", &self.stage())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Polars(e).with_context(context))
    }
}
