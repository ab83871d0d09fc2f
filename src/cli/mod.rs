//! Command-line parsing for the receipt importer.
//!
//! Argument parsing stays here; `app` turns the parsed args into an
//! `ImportConfig` and runs the pipeline.

use std::path::PathBuf;

use clap::{Args, Parser};

pub mod prompt;

pub use prompt::TerminalPrompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "spool-import",
    version,
    about = "Import filament purchases from receipts into Spoolman"
)]
pub struct Cli {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub import: ImportArgs,

    /// Log at debug level (RUST_LOG takes precedence when set).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Exactly one input source.
#[derive(Debug, Args, Clone)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// JSON file with an array of filaments (or {"filaments": [...]}).
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// PDF receipt to extract filaments from.
    #[arg(long, value_name = "FILE")]
    pub pdf: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    /// Spoolman base URL.
    #[arg(long, env = "SPOOLMAN_URL", default_value = "http://localhost:7912")]
    pub spoolman_url: String,

    /// Vendor name to file every filament under (defaults to each filament's brand).
    #[arg(long)]
    pub vendor: Option<String>,

    /// Vendor material database.
    #[arg(
        long,
        value_name = "FILE",
        env = "SPOOL_IMPORT_VENDOR_DATA",
        default_value = "resources/vendor-data.json"
    )]
    pub vendor_data: PathBuf,

    /// API key for structured PDF extraction.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Model used for structured PDF extraction.
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4")]
    pub openai_model: String,

    /// Resolve and preview everything, submit nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; unknown filaments get material defaults.
    #[arg(long)]
    pub no_input: bool,

    /// Also write the resolved filaments to this JSON file.
    #[arg(long, value_name = "FILE")]
    pub preview_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_flags_are_exclusive_and_required() {
        assert!(Cli::try_parse_from(["spool-import"]).is_err());
        assert!(Cli::try_parse_from(["spool-import", "--json", "a.json", "--pdf", "b.pdf"]).is_err());

        let cli = Cli::try_parse_from(["spool-import", "--pdf", "receipt.pdf", "--dry-run", "-v"]).unwrap();
        assert_eq!(cli.input.pdf, Some(PathBuf::from("receipt.pdf")));
        assert!(cli.input.json.is_none());
        assert!(cli.import.dry_run);
        assert!(cli.verbose);
    }

    #[test]
    fn vendor_and_preview_options() {
        let cli = Cli::try_parse_from([
            "spool-import",
            "--json",
            "order.json",
            "--vendor",
            "Bambu Lab",
            "--preview-json",
            "preview.json",
            "--no-input",
        ])
        .unwrap();
        assert_eq!(cli.import.vendor.as_deref(), Some("Bambu Lab"));
        assert_eq!(cli.import.preview_json, Some(PathBuf::from("preview.json")));
        assert!(cli.import.no_input);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
