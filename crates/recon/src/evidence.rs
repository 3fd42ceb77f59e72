use crate::model::{KeyPartition, Outcome, ReportEntry, ReportSummary, SourceLabel};

/// Compute summary statistics from built entries.
///
/// Matched keys contribute one set of cells (their source1 entry); the paired
/// source2 entry carries the same outcomes and is skipped.
pub fn compute_summary(partition: &KeyPartition, entries: &[ReportEntry]) -> ReportSummary {
    let mut summary = ReportSummary {
        matched_keys: partition.matched.len(),
        only_source1: partition.only_source1.len(),
        only_source2: partition.only_source2.len(),
        total_entries: entries.len(),
        ..ReportSummary::default()
    };
    summary.total_keys = summary.matched_keys + summary.only_source1 + summary.only_source2;

    for entry in entries {
        if !partition.matched.contains(&entry.key) {
            summary.outcome_counts.orphan += entry.values.len();
            continue;
        }
        if entry.source == SourceLabel::Source2 {
            continue;
        }

        let mut any_mismatch = false;
        for attr in entry.values.iter() {
            match attr.outcome {
                Outcome::Match => summary.outcome_counts.matched += 1,
                Outcome::Mismatch => {
                    summary.outcome_counts.mismatch += 1;
                    *summary.mismatches_by_path.entry(attr.path.clone()).or_insert(0) += 1;
                    any_mismatch = true;
                }
                Outcome::Orphan => summary.outcome_counts.orphan += 1,
            }
        }
        if any_mismatch {
            summary.mismatched_keys += 1;
        }
    }

    summary.fully_matched_keys = summary.matched_keys - summary.mismatched_keys;
    summary
}
