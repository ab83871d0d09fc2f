//! Top-level application orchestration.
//!
//! `src/main.rs` is tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - reads and resolves the filaments
//! - prints the preview and submits (unless this is a dry run)

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::SpoolmanClient;
use crate::cli::{Cli, TerminalPrompt};
use crate::domain::{ImportConfig, InputSource, LlmSettings};
use crate::enrich::BatchPolicy;
use crate::error::{AppError, EXIT_INPUT, EXIT_NOTHING_IMPORTED};
use crate::vendor::VendorDb;

pub mod pipeline;

/// Entry point for the `spool-import` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = import_config_from_args(&cli)?;
    handle_import(&config)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "spool_import=debug" } else { "spool_import=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_import(config: &ImportConfig) -> Result<(), AppError> {
    let mut db = VendorDb::from_file(&config.vendor_data)?;
    let ingested = pipeline::gather_inputs(config, &db)?;

    let prepared = if config.interactive && !config.dry_run {
        pipeline::prepare(ingested, &mut db, &mut TerminalPrompt::stdio())?
    } else {
        pipeline::prepare(ingested, &mut db, &mut BatchPolicy)?
    };

    println!("{}", crate::report::format_preview(&prepared));

    if let Some(path) = &config.preview_json {
        crate::io::write_preview_json(path, &prepared.enriched)?;
        info!(path = %path.display(), "wrote preview");
    }

    if prepared.enriched.is_empty() {
        return Err(AppError::new(EXIT_NOTHING_IMPORTED, "Import stopped before any filament was resolved."));
    }

    if config.dry_run {
        println!("\nDry run: nothing was submitted to {}.", config.spoolman_url);
        return Ok(());
    }

    let mut inventory = SpoolmanClient::new(&config.spoolman_url);
    let run = pipeline::submit_all(&prepared.enriched, &mut inventory, config.vendor_override.as_deref());
    println!("\n{}", crate::report::format_import_summary(&run));

    pipeline::check_imported(&run)
}

pub fn import_config_from_args(cli: &Cli) -> Result<ImportConfig, AppError> {
    let input = match (&cli.input.json, &cli.input.pdf) {
        (Some(path), None) => InputSource::Json(path.clone()),
        (None, Some(path)) => InputSource::Pdf(path.clone()),
        _ => return Err(AppError::new(EXIT_INPUT, "Provide exactly one of --json or --pdf.")),
    };

    let args = &cli.import;
    let llm = args
        .openai_api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| LlmSettings {
            api_key: key.to_string(),
            base_url: args.openai_base_url.clone(),
            model: args.openai_model.clone(),
        });

    Ok(ImportConfig {
        input,
        vendor_data: args.vendor_data.clone(),
        spoolman_url: args.spoolman_url.clone(),
        vendor_override: args
            .vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        llm,
        dry_run: args.dry_run,
        interactive: !args.no_input,
        preview_json: args.preview_json.clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn config_from_args() {
        let cli = Cli::try_parse_from([
            "spool-import",
            "--pdf",
            "receipt.pdf",
            "--vendor",
            "  ",
            "--openai-api-key",
            "sk-test",
            "--openai-model",
            "gpt-4o-mini",
            "--no-input",
        ])
        .unwrap();
        let config = import_config_from_args(&cli).unwrap();

        assert_eq!(config.input, InputSource::Pdf(PathBuf::from("receipt.pdf")));
        assert_eq!(config.vendor_override, None);
        assert!(!config.interactive);
        assert!(!config.dry_run);
        let llm = config.llm.unwrap();
        assert_eq!(llm.api_key, "sk-test");
        assert_eq!(llm.model, "gpt-4o-mini");
    }

    #[test]
    fn blank_api_key_disables_structured_extraction() {
        let cli = Cli::try_parse_from(["spool-import", "--json", "order.json", "--openai-api-key", ""]).unwrap();
        let config = import_config_from_args(&cli).unwrap();
        assert!(config.llm.is_none());
        assert_eq!(config.input, InputSource::Json(PathBuf::from("order.json")));
    }
}
