//! Serialization of generated OpenAPI documents to YAML or JSON.
//!
//! Output options are passed explicitly with every call; nothing here keeps state between
//! documents.

use crate::filters::DocumentMap;
use crate::naming::sanitize;
use crate::openapi::OpenApiDocument;
use crate::variant::DocumentVariantInfo;
use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Base name of every written document file
pub const DOCUMENT_FILE_STEM: &str = "openapi";

/// Output format for serialized documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    #[default]
    Yaml,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

/// How documents are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializationOptions {
    pub format: OutputFormat,
    /// Indent JSON output; YAML is always block formatted
    pub pretty: bool,
}

impl Default for SerializationOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Yaml,
            pretty: true,
        }
    }
}

/// Serializes an OpenAPI document with the given options.
///
/// # Arguments
///
/// * `doc` - The OpenAPI document to serialize
/// * `options` - Output format and layout
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use xmldoc_openapi::openapi::OpenApiDocument;
/// use xmldoc_openapi::serializer::{serialize_document, OutputFormat, SerializationOptions};
///
/// let doc = OpenApiDocument::new("3.0.1");
/// let options = SerializationOptions { format: OutputFormat::Json, pretty: false };
/// let json = serialize_document(&doc, &options).unwrap();
/// assert!(json.starts_with("{\"openapi\":\"3.0.1\""));
/// ```
pub fn serialize_document(doc: &OpenApiDocument, options: &SerializationOptions) -> Result<String> {
    match options.format {
        OutputFormat::Yaml => {
            debug!("Serializing OpenAPI document to YAML");
            serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
        }
        OutputFormat::Json if options.pretty => {
            debug!("Serializing OpenAPI document to pretty JSON");
            serde_json::to_string_pretty(doc)
                .context("Failed to serialize OpenAPI document to JSON")
        }
        OutputFormat::Json => {
            debug!("Serializing OpenAPI document to JSON");
            serde_json::to_string(doc).context("Failed to serialize OpenAPI document to JSON")
        }
    }
}

/// File name of a variant's document.
///
/// The default variant is written to `openapi.<ext>`, every other variant to
/// `openapi.<categorizer>.<title>.<ext>` with both parts sanitized.
pub fn document_file_name(variant: &DocumentVariantInfo, format: OutputFormat) -> String {
    if variant.is_default() {
        format!("{}.{}", DOCUMENT_FILE_STEM, format.extension())
    } else {
        format!(
            "{}.{}.{}.{}",
            DOCUMENT_FILE_STEM,
            sanitize(&variant.categorizer),
            sanitize(&variant.title),
            format.extension()
        )
    }
}

/// Writes string content to a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Writes one file per document variant into `output_dir`.
///
/// # Returns
///
/// The written paths, in document order.
///
/// # Errors
///
/// Returns an error if any document cannot be serialized or written.
pub fn write_documents(
    output_dir: &Path,
    documents: &DocumentMap,
    options: &SerializationOptions,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(documents.len());
    for (variant, document) in documents {
        let path = output_dir.join(document_file_name(variant, options.format));
        let content = serialize_document(document, options)
            .with_context(|| format!("Failed to serialize document for variant {}", variant))?;
        write_to_file(&content, &path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
