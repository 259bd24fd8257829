//! Loading the source CSV and deriving feature/label views from it.

use crate::error::{PrepError, Result};
use crate::utils::{clean_csv_content, missing_columns};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Load a CSV file with a header row.
///
/// Tries a standard quoted read first, then an unquoted read, then a read
/// of the content with doubled quotes collapsed and blank lines removed.
///
/// # Errors
///
/// `LoadFailed` naming the path if the file is missing or none of the
/// strategies can parse it.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    info!("Loading dataset from: {}", path.display());

    if !path.is_file() {
        error!("Input file not found: {}", path.display());
        return Err(PrepError::LoadFailed {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    let df = load_csv_with_fallbacks(path).map_err(|e| {
        error!("Error in loading data: {}", e);
        PrepError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    if df.width() == 0 {
        return Err(PrepError::LoadFailed {
            path: path.to_path_buf(),
            reason: "no columns found".to_string(),
        });
    }

    info!("Data loaded successfully: {:?}", df.shape());
    Ok(df)
}

fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: Pre-clean content
    let content = std::fs::read_to_string(path)?;
    let cursor = Cursor::new(clean_csv_content(&content));

    Ok(CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()?)
}

/// Fail with `MissingColumns` unless every `required` column is present.
pub fn require_columns(df: &DataFrame, required: &[String]) -> Result<()> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        error!("Dataset is missing required columns: {:?}", missing);
        Err(PrepError::MissingColumns(missing))
    }
}

/// Select the feature columns, in the given order.
pub fn feature_matrix(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    require_columns(df, columns)?;
    Ok(df.select(columns.iter().map(String::as_str))?)
}

/// Select the label column as a single-column frame.
pub fn label_vector(df: &DataFrame, column: &str) -> Result<DataFrame> {
    if df.column(column).is_err() {
        return Err(PrepError::ColumnNotFound(column.to_string()));
    }
    Ok(df.select([column])?)
}
