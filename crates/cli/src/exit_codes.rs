//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `jrecon` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Report produced, every key matched on every path          |
//! | 1    | Report produced, with mismatches and/or orphans           |
//! | 2    | Usage error (bad args, empty attribute path)              |
//! | 3    | An input is not valid JSON                                |
//! | 4    | An input has the wrong shape, or exceeds the size limit   |
//! | 5    | Invalid recon config                                      |
//! | 6    | IO error (missing file, cannot write output)              |
//!
//! Codes 3-6 mean no report was produced.

use jrecon_core::ReconError;

/// Success - report produced and clean.
pub const EXIT_SUCCESS: u8 = 0;

/// Report produced but sources disagree. Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_RECON_DIFFS: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Top-level payload could not be parsed as JSON.
pub const EXIT_INPUT_PARSE: u8 = 3;

/// Payload parsed but is neither a mapping nor a list of mappings, or is too large.
pub const EXIT_INPUT_SHAPE: u8 = 4;

/// Recon config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// File could not be read or written.
pub const EXIT_IO: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::JsonDecode { .. } => EXIT_INPUT_PARSE,
        ReconError::InputFormat { .. } | ReconError::InputTooLarge { .. } => EXIT_INPUT_SHAPE,
        ReconError::InvalidPath(_) => EXIT_USAGE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Io(_) => EXIT_IO,
    }
}
