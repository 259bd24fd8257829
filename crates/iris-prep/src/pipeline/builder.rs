//! Main preparation pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! sequencing load → sanitize → split → persist.

use crate::config::PipelineConfig;
use crate::dataset::{feature_matrix, label_vector, load_csv, require_columns};
use crate::error::Result;
use crate::persist::ArtifactWriter;
use crate::pipeline::outliers::OutlierSanitizer;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::split::DatasetSplitter;
use crate::types::PipelineResult;
use chrono::Utc;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The data preparation pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use iris_prep::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().input_path("data.csv").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// println!("{} train / {} test rows", result.rows_train, result.rows_test);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    writer: ArtifactWriter,
}

static_assertions::assert_impl_all!(Pipeline: Send);

// `Result::unwrap_err` in the tests requires `Pipeline: Debug`; the reporter
// trait object is not `Debug`, so this cannot be derived.
#[cfg(test)]
impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured input file and run every stage.
    pub fn run(&self) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let df = self.stage(PipelineStage::Loading, "Loading dataset...", || {
            load_csv(&self.config.input_path)
        })?;
        self.finish(df, start_time)
    }

    /// Run sanitize → split → persist on an already loaded frame.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        self.finish(df, Instant::now())
    }

    fn finish(&self, df: DataFrame, start_time: Instant) -> Result<PipelineResult> {
        match self.process_internal(df, start_time) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Run one stage, reporting its start and outcome and tagging any error
    /// with the stage.
    fn stage<T>(
        &self,
        stage: PipelineStage,
        message: &str,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        info!("{}", message);
        self.report_progress(ProgressUpdate::started(stage, message));

        match f() {
            Ok(value) => {
                self.report_progress(ProgressUpdate::completed(
                    stage,
                    format!("{} complete", stage.display_name()),
                ));
                Ok(value)
            }
            Err(e) => {
                let e = e.in_stage(stage);
                self.report_progress(ProgressUpdate::failed(stage, e.to_string()));
                Err(e)
            }
        }
    }

    fn process_internal(&self, mut df: DataFrame, start_time: Instant) -> Result<PipelineResult> {
        let config = &self.config;
        let rows_total = df.height();

        let outliers = self.stage(
            PipelineStage::OutlierHandling,
            "Handling outliers...",
            || OutlierSanitizer::sanitize(&mut df, &config.outlier_column),
        )?;

        let split = self.stage(PipelineStage::Splitting, "Splitting data...", || {
            // All columns must be present before any row is shuffled.
            require_columns(&df, &config.required_columns())?;
            let features = feature_matrix(&df, &config.feature_columns)?;
            let labels = label_vector(&df, &config.label_column)?;
            DatasetSplitter::split(&features, &labels, config.test_fraction, config.seed)
        })?;
        drop(df);

        let artifacts = self.stage(
            PipelineStage::Persisting,
            "Persisting train/test sets...",
            || self.writer.write_split(&split),
        )?;

        let mut result = PipelineResult {
            outliers,
            rows_total,
            rows_train: split.train_rows(),
            rows_test: split.test_rows(),
            test_fraction: config.test_fraction,
            seed: config.seed,
            artifacts,
            report_path: None,
            duration_ms: start_time.elapsed().as_millis() as u64,
            finished_at: Utc::now(),
        };

        if config.write_report {
            let path = self
                .writer
                .write_report(&result)
                .map_err(|e| e.in_stage(PipelineStage::Persisting))?;
            result.report_path = Some(path);
        }

        info!(
            "Pipeline finished in {}ms: {} train / {} test rows",
            result.duration_ms, result.rows_train, result.rows_test
        );
        Ok(result)
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving stage events.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience over [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let writer = ArtifactWriter::new(config.output_dir.clone());

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            writer,
        })
    }
}
