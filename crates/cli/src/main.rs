// jrecon CLI - reconcile two keyed JSON exports attribute by attribute

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jrecon_core::ReconError;

use exit_codes::{recon_exit_code, EXIT_SUCCESS};
use recon::{CompareArgs, OutputArgs};

#[derive(Parser)]
#[command(name = "jrecon")]
#[command(about = "Reconcile two keyed JSON exports attribute by attribute")]
#[command(version, long_version = long_version())]
struct Cli {
    /// Log engine progress to stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  jrecon run catalog.recon.toml
  jrecon run catalog.recon.toml --json
  jrecon run catalog.recon.toml --output report.html
  jrecon run catalog.recon.toml --output report.xlsx --no-fail")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Reconcile two JSON files directly
    #[command(after_help = "\
Examples:
  jrecon compare system1.json system2.json --path price.amount --path tags
  jrecon compare a.json b.json --paths-file paths.txt --strip-comments
  jrecon compare a.json b.json -p name -o report.csv --no-fail")]
    Compare(CompareArgs),

    /// Validate a recon config without running
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  jrecon-core ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, out } => recon::cmd_run(config, out),
        Commands::Compare(args) => recon::cmd_compare(args),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::JsonDecode { .. } => {
                Some("if the export carries // comments, pass --strip-comments or set options.strip_comments".to_string())
            }
            ReconError::InputFormat { .. } => {
                Some("expected {\"<id>.<version>\": {...}} or a list of such mappings".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
