use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::SourceLabels;

/// 256 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 256 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    pub paths: Vec<String>,
    #[serde(default)]
    pub options: ReconOptions,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options that change how payloads are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconOptions {
    /// Strip `//` line comments from raw text and embedded JSON strings.
    #[serde(default)]
    pub strip_comments: bool,
    #[serde(default)]
    pub key_split: KeySplit,
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
}

fn default_max_input_bytes() -> u64 {
    DEFAULT_MAX_INPUT_BYTES
}

impl Default for ReconOptions {
    fn default() -> Self {
        Self {
            strip_comments: false,
            key_split: KeySplit::default(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

/// Which dot separates `<id>` from `<version>` in a composite key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySplit {
    /// `a.b.3` → (`a.b`, `3`). Ids may contain dots.
    #[default]
    Last,
    /// `a.1.2` → (`a`, `1.2`). Versions may contain dots.
    First,
}

impl std::fmt::Display for KeySplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Last => write!(f, "last"),
            Self::First => write!(f, "first"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub source1: SourceConfig,
    pub source2: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Display name used in rendered reports ("System1", "Catalog", ...).
    pub label: String,
    /// JSON file, relative to the config file's directory.
    pub file: String,
}

impl SourcesConfig {
    pub fn labels(&self) -> SourceLabels {
        SourceLabels {
            source1: self.source1.label.clone(),
            source2: self.source2.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub xlsx: Option<String>,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Everything a single run needs besides the two payloads.
#[derive(Debug, Clone, Default)]
pub struct ReconJob {
    pub name: String,
    pub paths: Vec<String>,
    pub options: ReconOptions,
    pub labels: SourceLabels,
}

impl ReconJob {
    pub fn new(paths: Vec<String>) -> Self {
        Self {
            name: "adhoc".into(),
            paths,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn job(&self) -> ReconJob {
        ReconJob {
            name: self.name.clone(),
            paths: self.paths.clone(),
            options: self.options.clone(),
            labels: self.sources.labels(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        crate::extract::validate_paths(&self.paths)
            .map_err(|e| ReconError::ConfigValidation(e.to_string()))?;

        let s1 = &self.sources.source1;
        let s2 = &self.sources.source2;
        if s1.label.trim().is_empty() || s2.label.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "source labels must not be empty".into(),
            ));
        }
        if s1.label == s2.label {
            return Err(ReconError::ConfigValidation(format!(
                "source labels must differ, both are '{}'",
                s1.label
            )));
        }
        if s1.file.trim().is_empty() || s2.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "source file must not be empty".into(),
            ));
        }
        if self.options.max_input_bytes == 0 {
            return Err(ReconError::ConfigValidation(
                "max_input_bytes must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Catalog nightly"
paths = ["price.amount", "tags"]

[sources.source1]
label = "System1"
file = "system1.json"

[sources.source2]
label = "System2"
file = "system2.json"
"#;

    #[test]
    fn parse_valid_defaults() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Catalog nightly");
        assert_eq!(config.paths, vec!["price.amount", "tags"]);
        assert!(!config.options.strip_comments);
        assert_eq!(config.options.key_split, KeySplit::Last);
        assert_eq!(config.options.max_input_bytes, DEFAULT_MAX_INPUT_BYTES);
        assert!(config.output.json.is_none());
        assert_eq!(config.sources.labels().source2, "System2");
    }

    #[test]
    fn parse_options_and_output() {
        let input = format!(
            r#"{VALID}
[options]
strip_comments = true
key_split = "first"
max_input_bytes = 1024

[output]
json = "report.json"
html = "report.html"
"#
        );
        let config = ReconConfig::from_toml(&input).unwrap();
        assert!(config.options.strip_comments);
        assert_eq!(config.options.key_split, KeySplit::First);
        assert_eq!(config.options.max_input_bytes, 1024);
        assert_eq!(config.output.json.as_deref(), Some("report.json"));
        assert_eq!(config.output.html.as_deref(), Some("report.html"));
        assert!(config.output.csv.is_none());
    }

    #[test]
    fn reject_unknown_key_split() {
        let input = format!("{VALID}\n[options]\nkey_split = \"middle\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_typo_in_options() {
        let input = format!("{VALID}\n[options]\nstrip_coments = true\n");
        assert!(ReconConfig::from_toml(&input).is_err());
    }

    #[test]
    fn reject_empty_paths() {
        let input = VALID.replace(r#"paths = ["price.amount", "tags"]"#, "paths = []");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("at least one"), "{err}");
    }

    #[test]
    fn reject_blank_path() {
        let input = VALID.replace(r#""tags""#, r#""""#);
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn reject_same_labels() {
        let input = VALID.replace(r#"label = "System2""#, r#"label = "System1""#);
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn reject_missing_source() {
        let input = r#"
name = "Half"
paths = ["a"]

[sources.source1]
label = "System1"
file = "system1.json"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
