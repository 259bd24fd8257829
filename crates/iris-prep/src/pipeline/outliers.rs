//! Outlier handling module.
//!
//! Detects outliers in one numeric column with the IQR rule and replaces
//! them with the column median.

use crate::error::{PrepError, Result};
use crate::types::{OutlierBounds, OutlierReport};
use crate::utils::{is_numeric_dtype, numeric_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Multiplier applied to the IQR to place the fences.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Linear-interpolation quantile over already-sorted finite values.
///
/// `pos = q * (n - 1)`; the result interpolates between the two ranked
/// observations around `pos`. Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let pos = q * (sorted.len() as f64 - 1.0);
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    let a = sorted[idx];
    if frac == 0.0 {
        return Some(a);
    }
    let b = sorted[(idx + 1).min(sorted.len() - 1)];
    Some(a + (b - a) * frac)
}

impl OutlierBounds {
    /// Compute IQR fences and median over the finite values.
    ///
    /// NaN and infinities do not contribute; an infinity always lies outside
    /// the fences. Returns `None` if no finite value is present.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let iqr = q3 - q1;

        Some(Self {
            q1,
            q3,
            iqr,
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
            median,
        })
    }
}

/// Replaces IQR outliers in a column with the column median.
pub struct OutlierSanitizer;

impl OutlierSanitizer {
    /// Sanitize `column` of `df` in place.
    ///
    /// The column is always rewritten as `Float64` under the same name, even
    /// when it has no usable values. Values strictly outside
    /// `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`, infinities included, become the
    /// median; nulls and NaN are skipped for the statistics and left untouched.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` if the column is absent, `NonNumericColumn` if its
    /// dtype is not an integer or float type.
    pub fn sanitize(df: &mut DataFrame, column: &str) -> Result<OutlierReport> {
        info!("Starting outlier handling for column: {}", column);

        let series = df
            .column(column)
            .map_err(|_| PrepError::ColumnNotFound(column.to_string()))?
            .as_materialized_series()
            .clone();

        if !is_numeric_dtype(series.dtype()) {
            return Err(PrepError::NonNumericColumn {
                column: column.to_string(),
                dtype: format!("{}", series.dtype()),
            });
        }

        let values = numeric_values(&series)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let missing_values = values.len() - present.iter().filter(|v| !v.is_nan()).count();

        let Some(bounds) = OutlierBounds::compute(&present) else {
            debug!("Column '{}' has no usable values, nothing to sanitize", column);
            df.replace(column, Series::new(column.into(), values))?;
            return Ok(OutlierReport {
                column: column.to_string(),
                bounds: None,
                values_replaced: 0,
                missing_values,
            });
        };

        debug!(
            "Column '{}': Q1={}, Q3={}, IQR={}, bounds=[{}, {}], median={}",
            column, bounds.q1, bounds.q3, bounds.iqr, bounds.lower, bounds.upper, bounds.median
        );

        let mut values_replaced = 0;
        let sanitized: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| match v {
                Some(val) if bounds.is_outlier(val) => {
                    values_replaced += 1;
                    Some(bounds.median)
                }
                other => other,
            })
            .collect();

        df.replace(column, Series::new(column.into(), sanitized))?;

        info!(
            "Replaced {} outliers in '{}' with median {}",
            values_replaced, column, bounds.median
        );

        Ok(OutlierReport {
            column: column.to_string(),
            bounds: Some(bounds),
            values_replaced,
            missing_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn column_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    // ==================== quantile tests ====================

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(2.25));
        assert_eq!(quantile_sorted(&sorted, 0.75), Some(4.75));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(3.5));
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(100.0));
    }

    #[test]
    fn test_quantile_edge_inputs() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile_sorted(&[1.0, 2.0], 1.5), None);
    }

    #[test]
    fn test_bounds_scenario() {
        let bounds = OutlierBounds::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(bounds.q1, 2.25);
        assert_eq!(bounds.q3, 4.75);
        assert_eq!(bounds.iqr, 2.5);
        assert_eq!(bounds.lower, -1.5);
        assert_eq!(bounds.upper, 8.5);
        assert_eq!(bounds.median, 3.5);
    }

    #[test]
    fn test_bounds_order_independent() {
        let a = OutlierBounds::compute(&[100.0, 3.0, 1.0, 5.0, 2.0, 4.0]).unwrap();
        let b = OutlierBounds::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_quantile_exact_rank_next_to_infinity() {
        let sorted = [1.0, 2.0, 3.0, 4.0, f64::INFINITY];
        assert_eq!(quantile_sorted(&sorted, 0.75), Some(4.0));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(3.0));
    }

    #[test]
    fn test_bounds_ignore_infinities() {
        let bounds = OutlierBounds::compute(&[1.0, 2.0, f64::INFINITY, 3.0, 4.0]).unwrap();
        assert_eq!(bounds.q1, 1.75);
        assert_eq!(bounds.q3, 3.25);
        assert_eq!(bounds.median, 2.5);
        assert!(bounds.is_outlier(f64::INFINITY));
        assert!(bounds.is_outlier(f64::NEG_INFINITY));
        assert!(OutlierBounds::compute(&[f64::INFINITY, f64::NAN]).is_none());
    }

    #[test]
    fn test_bounds_ignore_nan() {
        let bounds = OutlierBounds::compute(&[f64::NAN, 1.0, 3.0]).unwrap();
        assert_eq!(bounds.median, 2.0);
        assert!(OutlierBounds::compute(&[f64::NAN]).is_none());
        assert!(OutlierBounds::compute(&[]).is_none());
    }

    // ==================== sanitize tests ====================

    #[test]
    fn test_sanitize_replaces_outlier_with_median() {
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
            "other" => [10.0, 20.0, 30.0, 40.0, 50.0, 600.0],
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "value").unwrap();

        assert_eq!(report.values_replaced, 1);
        assert_eq!(report.missing_values, 0);
        assert_eq!(
            column_values(&df, "value"),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(3.5)]
        );
        // Other columns untouched
        assert_eq!(column_values(&df, "other")[5], Some(600.0));
    }

    #[test]
    fn test_sanitize_low_outlier() {
        let mut df = df![
            "value" => [-1000.0, 10.0, 11.0, 12.0, 13.0, 14.0],
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        assert_eq!(report.values_replaced, 1);
        assert_eq!(column_values(&df, "value")[0], Some(11.5));
    }

    #[test]
    fn test_sanitize_constant_column_unchanged() {
        let mut df = df![
            "value" => [5.0, 5.0, 5.0, 5.0, 5.0],
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        let bounds = report.bounds.unwrap();

        assert_eq!(report.values_replaced, 0);
        assert_eq!(bounds.lower, 5.0);
        assert_eq!(bounds.upper, 5.0);
        assert_eq!(column_values(&df, "value"), vec![Some(5.0); 5]);
    }

    #[test]
    fn test_sanitize_single_value() {
        let mut df = df![
            "value" => [42.0],
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        assert_eq!(report.values_replaced, 0);
        assert_eq!(report.bounds.unwrap().iqr, 0.0);
        assert_eq!(column_values(&df, "value"), vec![Some(42.0)]);
    }

    #[test]
    fn test_sanitize_empty_column() {
        let mut df = df![
            "value" => Vec::<f64>::new(),
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        assert!(report.bounds.is_none());
        assert_eq!(report.values_replaced, 0);
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn test_sanitize_preserves_nulls_and_nan() {
        let mut df = df![
            "value" => [Some(1.0), None, Some(2.0), Some(f64::NAN), Some(3.0), Some(4.0), Some(5.0), Some(100.0)],
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "value").unwrap();

        assert_eq!(report.missing_values, 2);
        assert_eq!(report.values_replaced, 1);
        assert_eq!(report.bounds.unwrap().median, 3.5);

        let values = column_values(&df, "value");
        assert_eq!(values[1], None);
        assert!(values[3].unwrap().is_nan());
        assert_eq!(values[7], Some(3.5));
        assert_eq!(df.column("value").unwrap().null_count(), 1);
    }

    #[test]
    fn test_sanitize_integer_column_becomes_float() {
        let mut df = df![
            "count" => [1i64, 2, 3, 4, 5, 100],
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "count").unwrap();

        assert_eq!(report.values_replaced, 1);
        assert_eq!(df.column("count").unwrap().dtype(), &DataType::Float64);
        assert_eq!(column_values(&df, "count")[5], Some(3.5));
    }

    #[test]
    fn test_sanitize_replaces_infinity() {
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, f64::INFINITY],
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "value").unwrap();

        assert_eq!(report.values_replaced, 1);
        assert_eq!(report.missing_values, 0);
        assert_eq!(
            column_values(&df, "value"),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(2.5)]
        );
    }

    #[test]
    fn test_sanitize_all_null_integer_column_becomes_float() {
        let mut df = df![
            "count" => [None::<i64>, None, None],
        ]
        .unwrap();

        let report = OutlierSanitizer::sanitize(&mut df, "count").unwrap();

        assert!(report.bounds.is_none());
        assert_eq!(report.missing_values, 3);
        assert_eq!(df.column("count").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("count").unwrap().null_count(), 3);
    }

    #[test]
    fn test_sanitize_keeps_column_position() {
        let mut df = df![
            "a" => [1.0, 2.0],
            "value" => [3i32, 4],
            "b" => [5.0, 6.0],
        ]
        .unwrap();

        OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["a", "value", "b"]);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
        ]
        .unwrap();

        OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        let once = column_values(&df, "value");

        // Second pass bounds: Q1=2.25, Q3=3.875 -> [-0.1875, 6.3125]
        let second = OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        let twice = column_values(&df, "value");

        assert_eq!(second.values_replaced, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_second_pass_can_narrow_bounds() {
        // Replacing two far outliers shrinks the IQR enough that 1.0 falls
        // below the recomputed lower fence (1.575).
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0, -50.0, 3.3, 2.9, 4.1],
        ]
        .unwrap();

        let first = OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        assert_eq!(first.values_replaced, 2);

        let second = OutlierSanitizer::sanitize(&mut df, "value").unwrap();
        assert_eq!(second.values_replaced, 1);
    }

    #[test]
    fn test_sanitize_results_within_original_bounds() {
        let original = vec![0.5, 9.0, 2.0, 2.5, 3.0, 3.1, 2.8, -7.0, 3.3, 2.2, 15.0];
        let bounds = OutlierBounds::compute(&original).unwrap();
        let mut df = df![
            "value" => original.clone(),
        ]
        .unwrap();

        OutlierSanitizer::sanitize(&mut df, "value").unwrap();

        for value in column_values(&df, "value").into_iter().flatten() {
            assert!(
                !bounds.is_outlier(value),
                "{} is outside [{}, {}]",
                value,
                bounds.lower,
                bounds.upper
            );
        }
    }

    #[test]
    fn test_sanitize_missing_column() {
        let mut df = df![
            "other" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let err = OutlierSanitizer::sanitize(&mut df, "SepalWidthCm").unwrap_err();
        assert!(matches!(err, PrepError::ColumnNotFound(ref c) if c == "SepalWidthCm"));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_sanitize_non_numeric_column() {
        let mut df = df![
            "Species" => ["Iris-setosa", "Iris-virginica"],
        ]
        .unwrap();

        let err = OutlierSanitizer::sanitize(&mut df, "Species").unwrap_err();
        assert!(matches!(err, PrepError::NonNumericColumn { .. }));
        // Column untouched
        assert_eq!(df.column("Species").unwrap().dtype(), &DataType::String);
    }
}
