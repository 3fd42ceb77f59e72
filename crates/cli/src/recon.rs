//! `jrecon run` / `jrecon compare` / `jrecon validate`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use jrecon_cli::render::{render, ReportFormat};
use jrecon_core::config::DEFAULT_MAX_INPUT_BYTES;
use jrecon_core::engine::load_source_file;
use jrecon_core::model::{Report, SourceLabels};
use jrecon_core::{run, KeySplit, ReconConfig, ReconInput, ReconJob, ReconOptions, SourceLabel};
use log::debug;

use crate::exit_codes::{EXIT_IO, EXIT_RECON_DIFFS, EXIT_USAGE};
use crate::CliError;

/// Where and how to emit the finished report.
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Print the JSON report to stdout
    #[arg(long)]
    pub json: bool,

    /// Write the report to a file (format inferred from .json/.csv/.html/.xlsx)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Report format; overrides the --output extension, prints to stdout without --output
    #[arg(long, short = 'f')]
    pub format: Option<ReportFormat>,

    /// Exit 0 whenever a report is produced, even with mismatches or orphans
    #[arg(long)]
    pub no_fail: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeySplitArg {
    /// Split on the last dot: `a.b.3` → id `a.b`, version `3`
    Last,
    /// Split on the first dot: `a.1.2` → id `a`, version `1.2`
    First,
}

impl From<KeySplitArg> for KeySplit {
    fn from(arg: KeySplitArg) -> Self {
        match arg {
            KeySplitArg::Last => KeySplit::Last,
            KeySplitArg::First => KeySplit::First,
        }
    }
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// System1 JSON export
    pub source1: PathBuf,

    /// System2 JSON export
    pub source2: PathBuf,

    /// Dotted attribute path to compare (repeatable)
    #[arg(long = "path", short = 'p', value_name = "PATH")]
    pub paths: Vec<String>,

    /// File with one attribute path per line
    #[arg(long)]
    pub paths_file: Option<PathBuf>,

    /// Strip `//` line comments before parsing
    #[arg(long)]
    pub strip_comments: bool,

    /// Which dot separates id from version in composite keys
    #[arg(long, value_enum, default_value = "last")]
    pub key_split: KeySplitArg,

    /// Display name for source1
    #[arg(long, default_value = "System1")]
    pub label1: String,

    /// Display name for source2
    #[arg(long, default_value = "System2")]
    pub label2: String,

    /// Refuse inputs larger than this many bytes
    #[arg(long, env = "JRECON_MAX_INPUT_BYTES", default_value_t = DEFAULT_MAX_INPUT_BYTES)]
    pub max_input_bytes: u64,

    #[command(flatten)]
    pub out: OutputArgs,
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn cmd_run(config_path: PathBuf, out: OutputArgs) -> Result<(), CliError> {
    check_output(&out)?;
    let config = read_config(&config_path)?;
    let job = config.job();

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let source1 = load_source_file(
        &base_dir.join(&config.sources.source1.file),
        SourceLabel::Source1,
        &job.options,
    )
    .map_err(CliError::recon)?;
    let source2 = load_source_file(
        &base_dir.join(&config.sources.source2.file),
        SourceLabel::Source2,
        &job.options,
    )
    .map_err(CliError::recon)?;

    let report = run(&job, ReconInput { source1, source2 }).map_err(CliError::recon)?;

    let configured = [
        (&config.output.json, ReportFormat::Json),
        (&config.output.csv, ReportFormat::Csv),
        (&config.output.html, ReportFormat::Html),
        (&config.output.xlsx, ReportFormat::Xlsx),
    ];
    for (file, format) in configured {
        if let Some(file) = file {
            write_report(&report, &base_dir.join(file), format)?;
        }
    }

    finish(&report, &out)
}

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    check_output(&args.out)?;
    let mut paths = args.paths;
    if let Some(ref file) = args.paths_file {
        let text = std::fs::read_to_string(file)
            .map_err(|e| CliError::new(EXIT_IO, format!("cannot read {}: {e}", file.display())))?;
        paths.extend(parse_path_list(&text));
    }
    if paths.is_empty() {
        return Err(CliError::new(EXIT_USAGE, "no attribute paths given")
            .with_hint("pass --path price.amount (repeatable) or --paths-file paths.txt"));
    }

    let job = ReconJob {
        name: format!("{} vs {}", args.source1.display(), args.source2.display()),
        paths,
        options: ReconOptions {
            strip_comments: args.strip_comments,
            key_split: args.key_split.into(),
            max_input_bytes: args.max_input_bytes,
        },
        labels: SourceLabels {
            source1: args.label1,
            source2: args.label2,
        },
    };

    let source1 = load_source_file(&args.source1, SourceLabel::Source1, &job.options)
        .map_err(CliError::recon)?;
    let source2 = load_source_file(&args.source2, SourceLabel::Source2, &job.options)
        .map_err(CliError::recon)?;

    let report = run(&job, ReconInput { source1, source2 }).map_err(CliError::recon)?;
    finish(&report, &args.out)
}

/// One path per line; blank lines and surrounding whitespace are ignored.
pub fn parse_path_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "ok: \"{}\" compares {} path(s) between {} and {}",
        config.name,
        config.paths.len(),
        config.sources.source1.label,
        config.sources.source2.label,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn read_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot read config: {e}")))?;
    ReconConfig::from_toml(&config_str).map_err(CliError::recon)
}

fn write_report(report: &Report, path: &Path, format: ReportFormat) -> Result<(), CliError> {
    let bytes = render(report, format)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot render report: {e}")))?;
    std::fs::write(path, bytes)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot write {}: {e}", path.display())))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

/// Reject output flags that cannot be honoured, before any input is read.
fn check_output(out: &OutputArgs) -> Result<(), CliError> {
    match out.format {
        Some(format) if format.is_binary() && out.output.is_none() => Err(CliError::new(
            EXIT_USAGE,
            "xlsx reports are binary and cannot be printed to stdout",
        )
        .with_hint("pass --output report.xlsx")),
        _ => Ok(()),
    }
}

fn finish(report: &Report, out: &OutputArgs) -> Result<(), CliError> {
    if let Some(ref path) = out.output {
        let format = out.format.unwrap_or_else(|| ReportFormat::from_path(path));
        write_report(report, path, format)?;
    }

    let stdout_format = if out.json {
        Some(ReportFormat::Json)
    } else if out.output.is_none() {
        out.format
    } else {
        None
    };
    if let Some(format) = stdout_format {
        let bytes = render(report, format)
            .map_err(|e| CliError::new(EXIT_IO, format!("cannot render report: {e}")))?;
        let mut stdout = std::io::stdout().lock();
        let mut written = stdout.write_all(&bytes);
        if written.is_ok() && !bytes.ends_with(b"\n") {
            written = stdout.write_all(b"\n");
        }
        written.map_err(|e| CliError::new(EXIT_IO, format!("cannot write report: {e}")))?;
    }

    // Human summary to stderr
    let s = &report.summary;
    eprintln!(
        "{} keys: {} matched, {} with mismatches, {} only in {}, {} only in {}",
        s.total_keys,
        s.fully_matched_keys,
        s.mismatched_keys,
        s.only_source1,
        report.meta.labels.source1,
        s.only_source2,
        report.meta.labels.source2,
    );
    for (path, count) in &s.mismatches_by_path {
        debug!("path '{path}': {count} mismatched key(s)");
    }

    if s.is_clean() || out.no_fail {
        return Ok(());
    }
    Err(CliError::new(EXIT_RECON_DIFFS, "sources disagree")
        .with_hint("rerun with --json or --output report.html to see each attribute"))
}
