use crate::constants::{PROCESSED_AT_COLUMN, UNKNOWN_FILL};
use crate::dataset::{Column, ColumnKind, Dataset, Value};
use crate::error::{EtlError, Result};
use chrono::{Local, NaiveDateTime, SubsecRound};
use std::collections::HashSet;
use tracing::{error, info};

/// Lowercase, spaces to underscores, drop anything outside `[A-Za-z0-9_]`
pub fn clean_column_name(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Normalize every column name. Two names that normalize to the same
/// string are rejected rather than silently merged.
pub fn clean_column_names(dataset: &mut Dataset) -> Result<()> {
    let mut seen = HashSet::new();
    for name in dataset.column_names() {
        let cleaned = clean_column_name(name);
        if !seen.insert(cleaned.clone()) {
            return Err(EtlError::Validation(format!(
                "column '{}' collides with another column as '{}'",
                name, cleaned
            )));
        }
    }
    dataset.rename_columns(clean_column_name);
    Ok(())
}

/// Drop exact duplicate rows, keeping the first. Returns how many were removed.
pub fn drop_duplicates(dataset: &mut Dataset) -> usize {
    let before = dataset.height();
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(before);
        (0..before)
            .map(|i| {
                let key: Vec<_> = dataset.columns().iter().map(|c| c.values()[i].key()).collect();
                seen.insert(key)
            })
            .collect()
    };
    dataset.retain_rows(&keep);
    before - dataset.height()
}

/// Median of the non-null numeric cells
pub fn median(values: &[Value]) -> Option<f64> {
    let mut nums: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
    if nums.is_empty() {
        return None;
    }
    nums.sort_by(|a, b| a.total_cmp(b));
    let mid = nums.len() / 2;
    Some(if nums.len() % 2 == 0 {
        (nums[mid - 1] + nums[mid]) / 2.0
    } else {
        nums[mid]
    })
}

/// Fill nulls in numeric columns with the column median. An integer column
/// whose median is fractional becomes a float column.
pub fn fill_numeric_nulls(dataset: &mut Dataset) {
    for column in dataset.columns_mut() {
        let kind = column.kind();
        if !kind.is_numeric() || column.null_count() == 0 {
            continue;
        }
        let Some(fill) = median(column.values()) else {
            continue;
        };

        let as_int = kind == ColumnKind::Integer && fill.fract() == 0.0;
        for value in column.values_mut().iter_mut() {
            match value {
                Value::Null if as_int => *value = Value::Int(fill as i64),
                Value::Null => *value = Value::Float(fill),
                Value::Int(v) if !as_int => {
                    let promoted = *v as f64;
                    *value = Value::Float(promoted);
                }
                _ => {}
            }
        }
    }
}

/// Fill nulls in categorical (text or all-null) columns with "Unknown"
pub fn fill_categorical_nulls(dataset: &mut Dataset) {
    for column in dataset.columns_mut() {
        if !column.kind().is_categorical() {
            continue;
        }
        for value in column.values_mut().iter_mut().filter(|v| v.is_null()) {
            *value = Value::text(UNKNOWN_FILL);
        }
    }
}

pub fn stamp_processed_at(dataset: &mut Dataset, processed_at: NaiveDateTime) -> Result<()> {
    let values = vec![Value::Timestamp(processed_at); dataset.height()];
    dataset.push_column(Column::new(PROCESSED_AT_COLUMN, values))
}

/// Applies the cleaning rules in order: column names, duplicates, numeric
/// fill, categorical fill, processing timestamp.
#[derive(Debug, Default, Clone, Copy)]
pub struct Transformer;

impl Transformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, dataset: Dataset) -> Result<Dataset> {
        // Microsecond precision is what the parquet output can hold
        self.transform_at(dataset, Local::now().naive_local().trunc_subsecs(6))
    }

    /// Same rules with an explicit processing timestamp
    pub fn transform_at(&self, dataset: Dataset, processed_at: NaiveDateTime) -> Result<Dataset> {
        self.apply(dataset, processed_at).map_err(|e| {
            error!("Error transforming data: {}", e);
            e
        })
    }

    fn apply(&self, mut dataset: Dataset, processed_at: NaiveDateTime) -> Result<Dataset> {
        info!("Starting data transformation");

        clean_column_names(&mut dataset)?;

        let removed = drop_duplicates(&mut dataset);
        info!("Removed {} duplicate rows", removed);

        fill_numeric_nulls(&mut dataset);
        fill_categorical_nulls(&mut dataset);

        stamp_processed_at(&mut dataset, processed_at)?;

        let (rows, cols) = dataset.shape();
        info!("Transformation completed. Final shape: ({}, {})", rows, cols);
        Ok(dataset)
    }
}
