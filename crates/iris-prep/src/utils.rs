//! Shared utilities for the data preparation pipeline.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Read a numeric series as `f64` values, preserving nulls.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Names of `required` columns that `df` does not have, in the given order.
pub fn missing_columns(df: &DataFrame, required: &[String]) -> Vec<String> {
    let present: Vec<&str> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();

    required
        .iter()
        .filter(|name| !present.contains(&name.as_str()))
        .cloned()
        .collect()
}

// =============================================================================
// CSV Utilities
// =============================================================================

/// Clean CSV content: collapse doubled quotes and drop blank lines.
pub fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float32));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_values_casts_and_keeps_nulls() {
        let series = Series::new("v".into(), &[Some(1i32), None, Some(3)]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_missing_columns() {
        let df = df![
            "a" => [1.0],
            "b" => [2.0],
        ]
        .unwrap();
        let required = vec!["a".to_string(), "c".to_string(), "d".to_string()];
        assert_eq!(missing_columns(&df, &required), vec!["c", "d"]);
    }

    #[test]
    fn test_clean_csv_content() {
        let raw = "a,b\n\n\"\"x\"\",1\n   \n";
        assert_eq!(clean_csv_content(raw), "a,b\n\"x\",1");
    }
}
