// Report renderers for `jrecon`.
// Pure functions: a finished Report in, bytes out. No reconciliation logic.

use std::io;
use std::path::Path;

use jrecon_core::model::{Outcome, Report};
use jrecon_core::SourceLabel;
use rust_xlsxwriter::{Color, Format, Workbook};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Json,
    Csv,
    Html,
    Xlsx,
}

impl ReportFormat {
    /// Infer from a file extension; anything unrecognized is JSON.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("csv") => Self::Csv,
            Some("html") | Some("htm") => Self::Html,
            Some("xlsx") => Self::Xlsx,
            _ => Self::Json,
        }
    }

    /// Binary formats are only ever written to files.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Xlsx)
    }
}

pub fn render(report: &Report, format: ReportFormat) -> io::Result<Vec<u8>> {
    match format {
        ReportFormat::Json => serde_json::to_vec_pretty(report).map_err(io::Error::from),
        ReportFormat::Csv => to_csv(report).map(String::into_bytes),
        ReportFormat::Html => Ok(to_html(report).into_bytes()),
        ReportFormat::Xlsx => to_xlsx(report),
    }
}

// ---------------------------------------------------------------------------
// Row layout
// ---------------------------------------------------------------------------

/// One table row: a matched (key, path) with both sides, or an orphan (key, path).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow<'a> {
    /// `None` for a matched pair, otherwise the side the orphan came from.
    pub source: Option<SourceLabel>,
    pub id: &'a str,
    pub version: &'a str,
    pub attribute: &'a str,
    pub value1: Option<&'a Value>,
    pub value2: Option<&'a Value>,
    pub outcome: Outcome,
}

impl ReportRow<'_> {
    /// Text of the System column.
    pub fn system<'r>(&self, report: &'r Report) -> &'r str {
        match self.source {
            None => "Both",
            Some(source) => report.meta.labels.display(source),
        }
    }
}

/// Fold the report's entries into rows. A source1 entry directly followed by
/// the source2 entry for the same key is a matched pair and yields one row per path.
pub fn report_rows(report: &Report) -> Vec<ReportRow<'_>> {
    let mut rows = Vec::new();
    let mut entries = report.entries.iter().peekable();

    while let Some(entry) = entries.next() {
        let partner = entries.next_if(|next| {
            entry.source == SourceLabel::Source1
                && next.source == SourceLabel::Source2
                && next.key == entry.key
        });

        match partner {
            Some(other) => {
                for (attr1, attr2) in entry.values.iter().zip(other.values.iter()) {
                    rows.push(ReportRow {
                        source: None,
                        id: &entry.id,
                        version: &entry.version,
                        attribute: &attr1.path,
                        value1: attr1.value.as_ref(),
                        value2: attr2.value.as_ref(),
                        outcome: attr1.outcome,
                    });
                }
            }
            None => {
                for attr in entry.values.iter() {
                    let (value1, value2) = match entry.source {
                        SourceLabel::Source1 => (attr.value.as_ref(), None),
                        SourceLabel::Source2 => (None, attr.value.as_ref()),
                    };
                    rows.push(ReportRow {
                        source: Some(entry.source),
                        id: &entry.id,
                        version: &entry.version,
                        attribute: &attr.path,
                        value1,
                        value2,
                        outcome: attr.outcome,
                    });
                }
            }
        }
    }
    rows
}

pub fn headers(report: &Report) -> [String; 7] {
    let labels = &report.meta.labels;
    [
        "System".to_string(),
        "ID".to_string(),
        "Version".to_string(),
        "Attribute".to_string(),
        format!("Value ({})", labels.source1),
        format!("Value ({})", labels.source2),
        "Outcome".to_string(),
    ]
}

fn row_cells(report: &Report, row: &ReportRow<'_>) -> [String; 7] {
    [
        row.system(report).to_string(),
        row.id.to_string(),
        row.version.to_string(),
        row.attribute.to_string(),
        format_value(row.value1),
        format_value(row.value2),
        row.outcome.to_string(),
    ]
}

/// Cell text for an extracted value. Absent and null both render empty.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Row fill: match green, mismatch red, orphan yellow.
pub fn outcome_rgb(outcome: Outcome) -> u32 {
    match outcome {
        Outcome::Match => 0x00FF00,
        Outcome::Mismatch => 0xFF0000,
        Outcome::Orphan => 0xFFFF00,
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

pub fn to_csv(report: &Report) -> io::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers(report))?;
    for row in report_rows(report) {
        writer.write_record(row_cells(report, &row))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone HTML table, coloured by outcome.
pub fn to_html(report: &Report) -> String {
    let title = escape_html(&report.meta.name);
    let mut html = format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>Reconciliation Report - {title}</title>
<style>
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
th {{ background-color: #f2f2f2; }}
</style>
</head>
<body>
<h1>Reconciliation Report</h1>
<p>{title}: {} keys, {} matched, {} with mismatches, {} orphans</p>
<table>
<tr>",
        report.summary.total_keys,
        report.summary.fully_matched_keys,
        report.summary.mismatched_keys,
        report.summary.only_source1 + report.summary.only_source2,
    );
    for h in headers(report) {
        html.push_str(&format!("<th>{}</th>", escape_html(&h)));
    }
    html.push_str("</tr>\n");

    for row in report_rows(report) {
        html.push_str(&format!(
            "<tr style=\"background-color: #{:06X};\">",
            outcome_rgb(row.outcome)
        ));
        for cell in row_cells(report, &row) {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

pub const XLSX_SHEET_NAME: &str = "Reconciliation";

fn xlsx_err(context: &str, e: rust_xlsxwriter::XlsxError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{context}: {e}"))
}

/// Single-sheet workbook, every data row filled by outcome.
pub fn to_xlsx(report: &Report) -> io::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(XLSX_SHEET_NAME)
        .map_err(|e| xlsx_err("cannot create sheet", e))?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF2F2F2));

    let headers = headers(report);
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (col, h) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, h, &header_format)
            .map_err(|e| xlsx_err("cannot write header", e))?;
    }

    for (i, row) in report_rows(report).iter().enumerate() {
        let row_idx = (i + 1) as u32;
        let format = Format::new().set_background_color(Color::RGB(outcome_rgb(row.outcome)));
        for (col, cell) in row_cells(report, row).iter().enumerate() {
            worksheet
                .write_string_with_format(row_idx, col as u16, cell, &format)
                .map_err(|e| xlsx_err("cannot write cell", e))?;
            widths[col] = widths[col].max(cell.chars().count());
        }
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, (width + 2) as f64)
            .map_err(|e| xlsx_err("cannot size column", e))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| xlsx_err("cannot save workbook", e))
}
