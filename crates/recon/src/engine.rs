use std::path::Path;

use log::debug;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::classify::classify;
use crate::compare::values_equal;
use crate::config::{KeySplit, ReconJob, ReconOptions};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::extract::{extract, validate_paths};
use crate::key::split_key;
use crate::model::{
    AttributeValue, AttributeValues, KeyPartition, Outcome, Record, Report, ReportEntry, ReportMeta, SourceLabel,
    SourceTable,
};
use crate::normalize::{normalize, parse_source_text, table_to_value};

/// Two parsed payloads, one per source.
pub struct ReconInput {
    pub source1: Value,
    pub source2: Value,
}

/// Run reconciliation on parsed payloads. Returns the full report or nothing.
pub fn run(job: &ReconJob, input: ReconInput) -> Result<Report, ReconError> {
    let paths = validate_paths(&job.paths)?;

    let table1 = normalize(input.source1, &job.options)
        .map_err(|e| e.with_source(SourceLabel::Source1))?;
    let table2 = normalize(input.source2, &job.options)
        .map_err(|e| e.with_source(SourceLabel::Source2))?;

    let partition = classify(&table1, &table2);
    debug!(
        "classified keys: {} matched, {} only in source1, {} only in source2",
        partition.matched.len(),
        partition.only_source1.len(),
        partition.only_source2.len()
    );

    let entries = build_partitioned_entries(&partition, &table1, &table2, &paths, job.options.key_split);
    let summary = compute_summary(&partition, &entries);

    Ok(Report {
        meta: ReportMeta {
            name: job.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            labels: job.labels.clone(),
            paths,
            options: job.options.clone(),
            source1_digest: table_digest(&table1),
            source2_digest: table_digest(&table2),
        },
        summary,
        entries,
    })
}

/// Run reconciliation on raw JSON text.
pub fn run_text(job: &ReconJob, source1: &str, source2: &str) -> Result<Report, ReconError> {
    let input = ReconInput {
        source1: parse_checked(source1, &job.options)
            .map_err(|e| e.with_source(SourceLabel::Source1))?,
        source2: parse_checked(source2, &job.options)
            .map_err(|e| e.with_source(SourceLabel::Source2))?,
    };
    run(job, input)
}

fn parse_checked(text: &str, options: &ReconOptions) -> Result<Value, ReconError> {
    let bytes = text.len() as u64;
    if bytes > options.max_input_bytes {
        return Err(ReconError::InputTooLarge {
            source: None,
            bytes,
            limit: options.max_input_bytes,
        });
    }
    parse_source_text(text, options)
}

/// Build report entries: matched pairs, then source1 orphans, then source2 orphans,
/// each group in key order.
pub fn build_entries(
    table1: &SourceTable,
    table2: &SourceTable,
    paths: &[String],
    key_split: KeySplit,
) -> Vec<ReportEntry> {
    let partition = classify(table1, table2);
    build_partitioned_entries(&partition, table1, table2, paths, key_split)
}

/// Same as [`build_entries`], over a partition the caller already computed.
///
/// Keys the partition names but the tables lack are skipped.
pub fn build_partitioned_entries(
    partition: &KeyPartition,
    table1: &SourceTable,
    table2: &SourceTable,
    paths: &[String],
    key_split: KeySplit,
) -> Vec<ReportEntry> {
    let mut entries =
        Vec::with_capacity(partition.matched.len() * 2 + partition.only_source1.len() + partition.only_source2.len());

    for key in &partition.matched {
        let (Some(r1), Some(r2)) = (table1.get(key), table2.get(key)) else {
            continue;
        };
        let mut values1 = Vec::with_capacity(paths.len());
        let mut values2 = Vec::with_capacity(paths.len());

        for path in paths {
            let v1 = extract(r1, path);
            let v2 = extract(r2, path);
            let outcome = if values_equal(v1, v2) {
                Outcome::Match
            } else {
                Outcome::Mismatch
            };
            values1.push(AttributeValue {
                path: path.clone(),
                value: v1.cloned(),
                outcome,
            });
            values2.push(AttributeValue {
                path: path.clone(),
                value: v2.cloned(),
                outcome,
            });
        }

        entries.push(entry(SourceLabel::Source1, key, key_split, values1));
        entries.push(entry(SourceLabel::Source2, key, key_split, values2));
    }

    for key in &partition.only_source1 {
        if let Some(record) = table1.get(key) {
            entries.push(orphan_entry(SourceLabel::Source1, key, record, paths, key_split));
        }
    }
    for key in &partition.only_source2 {
        if let Some(record) = table2.get(key) {
            entries.push(orphan_entry(SourceLabel::Source2, key, record, paths, key_split));
        }
    }

    entries
}

fn orphan_entry(
    source: SourceLabel,
    key: &str,
    record: &Record,
    paths: &[String],
    key_split: KeySplit,
) -> ReportEntry {
    let values = paths
        .iter()
        .map(|path| AttributeValue {
            path: path.clone(),
            value: extract(record, path).cloned(),
            outcome: Outcome::Orphan,
        })
        .collect();
    entry(source, key, key_split, values)
}

fn entry(source: SourceLabel, key: &str, key_split: KeySplit, values: Vec<AttributeValue>) -> ReportEntry {
    let (id, version) = split_key(key, key_split);
    ReportEntry {
        source,
        key: key.to_string(),
        id: id.to_string(),
        version: version.to_string(),
        values: AttributeValues(values),
    }
}

/// SHA-256 of the table's canonical JSON → "sha256:<64 hex>".
pub fn table_digest(table: &SourceTable) -> String {
    let mut hasher = Sha256::new();
    hasher.update(table_to_value(table).to_string().as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// Read and parse one source file, enforcing the size limit before reading.
pub fn load_source_file(
    path: &Path,
    source: SourceLabel,
    options: &ReconOptions,
) -> Result<Value, ReconError> {
    let meta = std::fs::metadata(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
    if meta.len() > options.max_input_bytes {
        return Err(ReconError::InputTooLarge {
            source: Some(source),
            bytes: meta.len(),
            limit: options.max_input_bytes,
        });
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
    parse_source_text(&text, options).map_err(|e| e.with_source(source))
}
