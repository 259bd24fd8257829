//! Writing the split artifacts to disk.
//!
//! Each artifact is a Parquet file so feature dtypes (`f64`) and label
//! strings come back unchanged when the training stage reads them.

use crate::error::{PrepError, Result, ResultExt};
use crate::types::{ArtifactPaths, PipelineResult, SplitResult};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Artifact file stems, in write order.
pub const X_TRAIN: &str = "X_train";
pub const X_TEST: &str = "X_test";
pub const Y_TRAIN: &str = "y_train";
pub const Y_TEST: &str = "y_test";

/// Extension shared by all artifacts.
pub const ARTIFACT_EXTENSION: &str = "parquet";

/// File name of the optional JSON run report.
pub const REPORT_FILE_NAME: &str = "split_report.json";

/// Writes split artifacts into one directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path an artifact with the given stem is written to.
    pub fn artifact_path(&self, stem: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", stem, ARTIFACT_EXTENSION))
    }

    /// Create the output directory and write all four artifacts.
    ///
    /// Files are written one by one; if a later write fails, files already
    /// written stay on disk.
    pub fn write_split(&self, split: &SplitResult) -> Result<ArtifactPaths> {
        self.ensure_output_dir()?;

        let paths = ArtifactPaths {
            x_train: self.write_frame(X_TRAIN, &split.x_train)?,
            x_test: self.write_frame(X_TEST, &split.x_test)?,
            y_train: self.write_frame(Y_TRAIN, &split.y_train)?,
            y_test: self.write_frame(Y_TEST, &split.y_test)?,
        };

        info!("Train/test sets saved to {}", self.output_dir.display());
        Ok(paths)
    }

    /// Write the run summary as pretty JSON.
    pub fn write_report(&self, result: &PipelineResult) -> Result<PathBuf> {
        self.ensure_output_dir()?;

        let report_path = self.output_dir.join(REPORT_FILE_NAME);
        let json = serde_json::to_string_pretty(result)?;
        let mut file = File::create(&report_path).map_err(|e| persist_error(&report_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| persist_error(&report_path, e))?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }

    fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| persist_error(&self.output_dir, e))
    }

    fn write_frame(&self, stem: &str, df: &DataFrame) -> Result<PathBuf> {
        let path = self.artifact_path(stem);
        let mut file = File::create(&path).map_err(|e| persist_error(&path, e))?;

        // ParquetWriter::finish needs &mut
        let mut df = df.clone();
        ParquetWriter::new(&mut file)
            .finish(&mut df)
            .map_err(|e| persist_error(&path, e))?;

        info!("Saved {} ({} rows): {}", stem, df.height(), path.display());
        Ok(path)
    }
}

fn persist_error(path: &Path, err: impl std::fmt::Display) -> PrepError {
    error!("Failed to write {}: {}", path.display(), err);
    PrepError::PersistFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Read an artifact written by [`ArtifactWriter`].
pub fn read_artifact(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| PrepError::LoadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    ParquetReader::new(file)
        .finish()
        .context(format!("reading artifact '{}'", path.display()))
}
