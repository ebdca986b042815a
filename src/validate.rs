use crate::dataset::Dataset;
use crate::error::{EtlError, Result};
use std::collections::BTreeSet;

/// Basic checks: at least one row, and every required column present.
///
/// The pipeline driver does not call this; it is here for callers that want
/// to gate a dataset before loading it.
pub fn validate_dataset(dataset: &Dataset, required_columns: &[&str]) -> Result<()> {
    if dataset.is_empty() {
        return Err(EtlError::Validation("Dataset is empty".to_string()));
    }

    let present: BTreeSet<&str> = dataset.column_names().into_iter().collect();
    let missing: BTreeSet<&str> = required_columns
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect();

    if !missing.is_empty() {
        let names: Vec<&str> = missing.into_iter().collect();
        return Err(EtlError::Validation(format!(
            "Missing required columns: {}",
            names.join(", ")
        )));
    }
    Ok(())
}
