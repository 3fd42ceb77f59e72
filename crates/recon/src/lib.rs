//! `jrecon-core`: keyed JSON reconciliation engine.
//!
//! Pure engine crate: receives two payloads and a list of attribute paths,
//! returns an ordered report of per-path match / mismatch / orphan outcomes.
//! No CLI or rendering dependencies.

pub mod classify;
pub mod comments;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod key;
pub mod model;
pub mod normalize;

pub use config::{KeySplit, ReconConfig, ReconJob, ReconOptions};
pub use engine::{build_entries, build_partitioned_entries, run, run_text, ReconInput};
pub use error::ReconError;
pub use model::{Outcome, Record, Report, ReportEntry, SourceLabel, SourceTable};
