//! xmldoc-openapi - Command-line tool for generating OpenAPI documents.
//!
//! Reads the XML documentation files the .NET compiler emits for annotated controllers, together
//! with type sources describing the contract types, and writes one OpenAPI document per document
//! variant.
//!
//! # Usage
//!
//! ```bash
//! xmldoc-openapi --xml <FILE>... [--types <PATH>...] [--config <FILE>] [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Print the default document as YAML:
//! ```bash
//! xmldoc-openapi --xml Contoso.Api.xml --types contracts/
//! ```
//!
//! Write every variant as JSON:
//! ```bash
//! xmldoc-openapi --xml Contoso.Api.xml --types types.yaml --config config.xml -f json -o out/
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! xmldoc-openapi --xml Contoso.Api.xml -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use xmldoc_openapi::cli;
use xmldoc_openapi::diagnostics::GenerationStatus;

fn main() -> Result<()> {
    // Parse once before logger init so --verbose can pick the level
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("xmldoc-openapi starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    let status = cli::run(args)?;

    if status == GenerationStatus::Failure {
        error!("OpenAPI document generation finished with failures");
        std::process::exit(1);
    }
    info!("OpenAPI document generation completed");

    Ok(())
}
