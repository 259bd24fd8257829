use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// IQR fences and center computed for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub median: f64,
}

impl OutlierBounds {
    /// Whether `value` falls strictly outside `[lower, upper]`.
    ///
    /// NaN is never an outlier.
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// What sanitizing a column did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierReport {
    pub column: String,
    /// `None` when the column had no usable values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<OutlierBounds>,
    pub values_replaced: usize,
    /// Nulls and NaN, excluded from statistics and left as they were.
    pub missing_values: usize,
}

/// Original row indices routed to each partition, in output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// The four owned artifacts of a train/test split.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: DataFrame,
    pub y_test: DataFrame,
    pub indices: SplitIndices,
}

impl SplitResult {
    pub fn train_rows(&self) -> usize {
        self.x_train.height()
    }

    pub fn test_rows(&self) -> usize {
        self.x_test.height()
    }
}

/// Where each artifact was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub x_train: PathBuf,
    pub x_test: PathBuf,
    pub y_train: PathBuf,
    pub y_test: PathBuf,
}

impl ArtifactPaths {
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.x_train, &self.x_test, &self.y_train, &self.y_test].into_iter()
    }
}

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub outliers: OutlierReport,
    pub rows_total: usize,
    pub rows_train: usize,
    pub rows_test: usize,
    pub test_fraction: f64,
    pub seed: u64,
    pub artifacts: ArtifactPaths,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = OutlierBounds {
            q1: 2.25,
            q3: 4.75,
            iqr: 2.5,
            lower: -1.5,
            upper: 8.5,
            median: 3.5,
        };
        assert!(!bounds.is_outlier(-1.5));
        assert!(!bounds.is_outlier(8.5));
        assert!(bounds.is_outlier(8.5001));
        assert!(bounds.is_outlier(-2.0));
        assert!(!bounds.is_outlier(f64::NAN));
    }

    #[test]
    fn test_report_skips_missing_bounds() {
        let report = OutlierReport {
            column: "x".to_string(),
            bounds: None,
            values_replaced: 0,
            missing_values: 3,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("bounds"));
        assert!(json.contains("\"missing_values\":3"));
    }
}
