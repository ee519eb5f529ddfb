use crate::diagnostics::{GenerationDiagnostic, GenerationStatus};
use crate::generator::{GenerationInput, OpenApiGenerator};
use crate::scanner::load_type_sources;
use crate::serializer::{
    serialize_document, write_documents, write_to_file, OutputFormat, SerializationOptions,
};
use crate::settings::GenerationSettings;
use crate::type_resolver::TypeCatalog;
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// xmldoc-openapi - Generate OpenAPI documents from .NET XML documentation comments
#[derive(Parser, Debug)]
#[command(name = "xmldoc-openapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// XML documentation files produced by the compiler
    #[arg(long = "xml", value_name = "FILE", required = true, num_args = 1..)]
    pub xml_files: Vec<PathBuf>,

    /// Type sources: Rust contract files, YAML/JSON type manifests, or directories of them
    #[arg(short = 't', long = "types", value_name = "PATH", num_args = 1..)]
    pub type_sources: Vec<PathBuf>,

    /// Advanced configuration XML (document variants, common annotations)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Generation settings (YAML or JSON)
    #[arg(short = 's', long = "settings", value_name = "FILE")]
    pub settings_path: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Write compact JSON instead of indented JSON
    #[arg(long = "compact")]
    pub compact: bool,

    /// Output directory, one file per document variant (if not specified, the default document
    /// is printed to stdout)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write the generation diagnostic as JSON to this file
    #[arg(long = "diagnostics", value_name = "FILE")]
    pub diagnostics_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn serialization_options(&self) -> SerializationOptions {
        SerializationOptions {
            format: self.output_format,
            pretty: !self.compact,
        }
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    for xml in &args.xml_files {
        if !xml.is_file() {
            bail!("XML documentation file does not exist: {}", xml.display());
        }
    }
    for source in &args.type_sources {
        if !source.exists() {
            bail!("Type source does not exist: {}", source.display());
        }
    }
    if let Some(config) = &args.config_path {
        if !config.is_file() {
            bail!("Configuration file does not exist: {}", config.display());
        }
    }
    if let Some(output) = &args.output_dir {
        if output.is_file() {
            bail!("Output path is a file, expected a directory: {}", output.display());
        }
    }

    info!("XML documentation files: {}", args.xml_files.len());
    info!("Type sources: {}", args.type_sources.len());
    info!("Output format: {:?}", args.output_format);
    match &args.output_dir {
        Some(output) => info!("Output directory: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Run the main workflow and return the overall generation status
pub fn run(args: CliArgs) -> Result<GenerationStatus> {
    info!("Starting OpenAPI document generation...");

    let settings = match &args.settings_path {
        Some(path) => GenerationSettings::from_file(path)?,
        None => GenerationSettings::default(),
    };

    let catalog = if args.type_sources.is_empty() {
        warn!("No type sources given; only system types can be referenced");
        TypeCatalog::new()
    } else {
        info!("Loading type sources...");
        load_type_sources(&args.type_sources)?
    };

    info!("Reading XML documentation...");
    let input = GenerationInput::load(&args.xml_files, args.config_path.as_deref(), settings)
        .context("Failed to load generation input")?;

    let generator = OpenApiGenerator::new(&catalog);
    let output = generator.generate(&input);
    let status = output.status();

    report(&output.diagnostic);
    if let Some(path) = &args.diagnostics_path {
        let content = serde_json::to_string_pretty(&output.diagnostic)
            .context("Failed to serialize generation diagnostic")?;
        write_to_file(&content, path)?;
    }

    let options = args.serialization_options();
    match &args.output_dir {
        Some(output_dir) => {
            let written = write_documents(output_dir, &output.documents, &options)?;
            info!("Wrote {} document(s) to {}", written.len(), output_dir.display());
        }
        None => match output.default_document() {
            Some(document) => {
                println!("{}", serialize_document(document, &options)?);
                if output.documents.len() > 1 {
                    warn!(
                        "{} document variant(s) not printed; use --output to write them",
                        output.documents.len() - 1
                    );
                }
            }
            None => info!("No documents were generated; nothing to print"),
        },
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Documents: {}", output.documents.len());
    info!(
        "  - Operations: {}",
        output.diagnostic.operation_generation_diagnostics.len()
    );
    info!("  - Status: {:?}", status);

    Ok(status)
}

fn report(diagnostic: &GenerationDiagnostic) {
    for error in &diagnostic.document_generation_diagnostic.errors {
        warn!("Document: {}", error.message);
    }
    for operation in &diagnostic.operation_generation_diagnostics {
        if operation.generation_status == GenerationStatus::Success {
            continue;
        }
        for error in &operation.errors {
            warn!(
                "{} {} ({:?}): {}",
                operation.operation_method,
                operation.path,
                operation.generation_status,
                error.message
            );
        }
    }
}
