use std::collections::BTreeSet;

use log::warn;
use serde_json::Value;

use crate::error::ReconError;
use crate::model::Record;

/// Resolve a dotted path against a record. `None` is the absence marker.
pub fn extract<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    extract_value(record.as_value()?, path)
}

/// Walk `path` through nested mappings.
///
/// Stops with `None` at the first missing key or the first non-mapping
/// reached before the path is exhausted.
pub fn extract_value<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Check a caller-supplied path list and drop repeats, keeping first occurrences.
pub fn validate_paths(paths: &[String]) -> Result<Vec<String>, ReconError> {
    if paths.is_empty() {
        return Err(ReconError::InvalidPath(
            "at least one attribute path is required".into(),
        ));
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut unique: Vec<String> = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        if path.is_empty() {
            return Err(ReconError::InvalidPath(format!("path #{} is empty", i + 1)));
        }
        if !seen.insert(path.as_str()) {
            warn!("attribute path '{path}' listed more than once, keeping the first");
            continue;
        }
        unique.push(path.clone());
    }
    Ok(unique)
}
