use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::config::ReconOptions;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which side of the reconciliation a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLabel {
    Source1,
    Source2,
}

impl SourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source1 => "source1",
            Self::Source2 => "source2",
        }
    }
}

impl std::fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record value after normalization.
///
/// Top-level string values are decoded once as embedded JSON. A string that
/// does not decode stays `Raw` and is never descended into.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Raw(String),
    Decoded(Value),
}

impl Record {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Decoded(v) => Some(v),
            Self::Raw(_) => None,
        }
    }

    /// The record as a plain JSON value (`Raw` becomes a JSON string).
    pub fn to_value(&self) -> Value {
        match self {
            Self::Raw(s) => Value::String(s.clone()),
            Self::Decoded(v) => v.clone(),
        }
    }
}

/// Composite key → record, one per source. Key-sorted so iteration is deterministic.
pub type SourceTable = BTreeMap<String, Record>;

/// Keys of two source tables split into matched and orphan sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPartition {
    pub matched: BTreeSet<String>,
    pub only_source1: BTreeSet<String>,
    pub only_source2: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Match,
    Mismatch,
    Orphan,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Mismatch => write!(f, "mismatch"),
            Self::Orphan => write!(f, "orphan"),
        }
    }
}

/// Extracted value at one attribute path. `value: None` is the absence marker;
/// a present JSON null is `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    pub path: String,
    pub value: Option<Value>,
    pub outcome: Outcome,
}

/// Per-path values of one entry, in the caller's path order.
/// Serializes as a JSON object keyed by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeValues(pub Vec<AttributeValue>);

impl AttributeValues {
    pub fn get(&self, path: &str) -> Option<&AttributeValue> {
        self.0.iter().find(|v| v.path == path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Serialize)]
struct AttributeCell<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a Value>,
    outcome: Outcome,
}

impl Serialize for AttributeValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in &self.0 {
            map.serialize_entry(
                &attr.path,
                &AttributeCell {
                    value: attr.value.as_ref(),
                    outcome: attr.outcome,
                },
            )?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub source: SourceLabel,
    pub key: String,
    pub id: String,
    pub version: String,
    pub values: AttributeValues,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    #[serde(rename = "match")]
    pub matched: usize,
    pub mismatch: usize,
    pub orphan: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub total_keys: usize,
    pub matched_keys: usize,
    /// Matched keys where every path agrees.
    pub fully_matched_keys: usize,
    /// Matched keys with at least one disagreeing path.
    pub mismatched_keys: usize,
    pub only_source1: usize,
    pub only_source2: usize,
    pub total_entries: usize,
    /// Counted once per (key, path), not once per paired entry.
    pub outcome_counts: OutcomeCounts,
    pub mismatches_by_path: BTreeMap<String, usize>,
}

impl ReportSummary {
    pub fn is_clean(&self) -> bool {
        self.mismatched_keys == 0 && self.only_source1 == 0 && self.only_source2 == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceLabels {
    pub source1: String,
    pub source2: String,
}

impl Default for SourceLabels {
    fn default() -> Self {
        Self {
            source1: "System1".into(),
            source2: "System2".into(),
        }
    }
}

impl SourceLabels {
    pub fn display(&self, source: SourceLabel) -> &str {
        match source {
            SourceLabel::Source1 => &self.source1,
            SourceLabel::Source2 => &self.source2,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub name: String,
    pub engine_version: String,
    pub run_at: String,
    pub labels: SourceLabels,
    pub paths: Vec<String>,
    pub options: ReconOptions,
    pub source1_digest: String,
    pub source2_digest: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub summary: ReportSummary,
    pub entries: Vec<ReportEntry>,
}
