// Entropy Engine Stream - CSV replay
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! CSV replay source.
//!
//! Reads the `value` column of a headed CSV file into a
//! [`ReplaySource`]. Blank or unparsable cells are skipped.

use crate::error::{Result, StreamError};
use entropy_engine::{ReplayEnd, ReplaySource};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Column holding the samples.
pub const VALUE_COLUMN: &str = "value";

/// Read the `value` column from any CSV reader.
pub fn read_values<R: Read>(reader: R) -> Result<Vec<f64>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim() == VALUE_COLUMN)
        .ok_or_else(|| StreamError::MissingColumn(VALUE_COLUMN.to_string()))?;

    let mut values = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let record = result?;
        match record
            .get(column)
            .map(str::trim)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|x| x.is_finite())
        {
            Some(x) => values.push(x),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} rows without a numeric value", skipped);
    }
    if values.is_empty() {
        return Err(StreamError::EmptyDataset);
    }
    Ok(values)
}

/// Load a CSV file into a replay source.
pub fn load_csv<P: AsRef<Path>>(path: P, end: ReplayEnd) -> Result<ReplaySource> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StreamError::FileNotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    let values = read_values(file)?;
    info!("Loaded {} samples from {}", values.len(), path.display());
    Ok(ReplaySource::new(values, end))
}
