use std::fmt;

use crate::model::SourceLabel;

#[derive(Debug)]
pub enum ReconError {
    /// Top-level payload is neither a mapping nor a sequence of mappings.
    InputFormat {
        source: Option<SourceLabel>,
        found: String,
    },
    /// Top-level text is not valid JSON.
    JsonDecode {
        source: Option<SourceLabel>,
        message: String,
        line: usize,
        column: usize,
    },
    /// Payload exceeds the configured input size limit.
    InputTooLarge {
        source: Option<SourceLabel>,
        bytes: u64,
        limit: u64,
    },
    /// Empty attribute path, or no paths at all.
    InvalidPath(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate labels, missing paths, etc.).
    ConfigValidation(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl ReconError {
    /// Tag a payload error with the source it came from. Other variants pass through.
    pub fn with_source(self, label: SourceLabel) -> Self {
        match self {
            Self::InputFormat { found, .. } => Self::InputFormat {
                source: Some(label),
                found,
            },
            Self::JsonDecode {
                message,
                line,
                column,
                ..
            } => Self::JsonDecode {
                source: Some(label),
                message,
                line,
                column,
            },
            Self::InputTooLarge { bytes, limit, .. } => Self::InputTooLarge {
                source: Some(label),
                bytes,
                limit,
            },
            other => other,
        }
    }

    pub(crate) fn json_decode(err: &serde_json::Error) -> Self {
        Self::JsonDecode {
            source: None,
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// True for failures caused by the payload itself rather than config or IO.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InputFormat { .. } | Self::JsonDecode { .. } | Self::InputTooLarge { .. }
        )
    }
}

fn source_prefix(source: &Option<SourceLabel>) -> String {
    match source {
        Some(label) => format!("{label}: "),
        None => String::new(),
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputFormat { source, found } => write!(
                f,
                "{}input must be a mapping or a list of mappings, found {found}",
                source_prefix(source)
            ),
            Self::JsonDecode { source, message, .. } => {
                write!(f, "{}input is not valid JSON: {message}", source_prefix(source))
            }
            Self::InputTooLarge { source, bytes, limit } => write!(
                f,
                "{}input is {bytes} bytes, limit is {limit}",
                source_prefix(source)
            ),
            Self::InvalidPath(msg) => write!(f, "invalid attribute path: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
