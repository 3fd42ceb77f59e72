use log::{debug, warn};
use serde_json::{Map, Value};

use crate::comments::strip_line_comments;
use crate::config::ReconOptions;
use crate::error::ReconError;
use crate::model::{Record, SourceTable};

/// Parse a raw payload, stripping `//` comments first when enabled.
pub fn parse_source_text(text: &str, options: &ReconOptions) -> Result<Value, ReconError> {
    let result = if options.strip_comments {
        serde_json::from_str(&strip_line_comments(text))
    } else {
        serde_json::from_str(text)
    };
    result.map_err(|e| ReconError::json_decode(&e))
}

/// Flatten a parsed payload into a key-sorted table.
///
/// A mapping is taken as-is; a list of mappings is merged in order with later
/// keys winning. String values are decoded as embedded JSON when possible.
pub fn normalize(raw: Value, options: &ReconOptions) -> Result<SourceTable, ReconError> {
    let merged = match raw {
        Value::Object(map) => map,
        Value::Array(items) => merge_mappings(items)?,
        other => {
            return Err(ReconError::InputFormat {
                source: None,
                found: describe(&other).into(),
            })
        }
    };

    let table: SourceTable = merged
        .into_iter()
        .map(|(key, value)| {
            let record = match value {
                Value::String(s) => decode_embedded(&s, options.strip_comments),
                other => Record::Decoded(other),
            };
            (key, record)
        })
        .collect();

    debug!("normalized {} records", table.len());
    Ok(table)
}

fn merge_mappings(items: Vec<Value>) -> Result<Map<String, Value>, ReconError> {
    let mut merged = Map::new();
    for (index, item) in items.into_iter().enumerate() {
        let map = match item {
            Value::Object(map) => map,
            other => {
                return Err(ReconError::InputFormat {
                    source: None,
                    found: format!("a list containing {} at index {index}", describe(&other)),
                })
            }
        };
        for (key, value) in map {
            if merged.insert(key.clone(), value).is_some() {
                warn!("duplicate key '{key}' at list index {index} overwrites earlier value");
            }
        }
    }
    Ok(merged)
}

/// Re-normalize an already tagged table.
///
/// `Decoded` records are kept as they are, so a decoded string is never
/// decoded a second time. `Raw` records get another decode attempt under
/// `options`, which only changes them when comment stripping is newly enabled.
/// `normalize_table(normalize(x)?, o) == normalize(x)?` for the same options.
pub fn normalize_table(table: SourceTable, options: &ReconOptions) -> SourceTable {
    table
        .into_iter()
        .map(|(key, record)| {
            let record = match record {
                Record::Raw(s) => decode_embedded(&s, options.strip_comments),
                decoded => decoded,
            };
            (key, record)
        })
        .collect()
}

/// Best-effort decode of a string that may hold a JSON document.
///
/// Anything that does not parse is kept verbatim as `Record::Raw`.
pub fn decode_embedded(text: &str, strip_comments: bool) -> Record {
    let parsed = if strip_comments {
        serde_json::from_str::<Value>(&strip_line_comments(text))
    } else {
        serde_json::from_str::<Value>(text)
    };
    match parsed {
        Ok(value) => Record::Decoded(value),
        Err(_) => Record::Raw(text.to_string()),
    }
}

/// The table as a JSON mapping of plain values.
pub fn table_to_value(table: &SourceTable) -> Value {
    Value::Object(
        table
            .iter()
            .map(|(k, record)| (k.clone(), record.to_value()))
            .collect(),
    )
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
