//! xmldoc-openapi - OpenAPI documents from .NET XML documentation comments.
//!
//! Controllers annotated with `<url>`, `<verb>`, `<param>`, `<response>` and friends in their XML
//! doc comments are turned into OpenAPI v3 documents. Contract types are described by type
//! sources (Rust contract files or YAML/JSON manifests) instead of runtime reflection.
//!
//! # Architecture
//!
//! 1. [`scanner`] and [`parser`] - Load type sources into a [`type_resolver::TypeCatalog`]
//! 2. [`xml`] - Owned, mutable XML trees for the annotation and configuration files
//! 3. [`classifier`] and [`naming`] - Classify types and sanitize schema keys
//! 4. [`schema_registry`] - Intern object schemas under `#/components/schemas`
//! 5. [`filters`] - The ordered preprocessing, operation, document, config and post-processing
//!    filter chains
//! 6. [`generator`] - Runs the chains once per document variant and collects diagnostics
//! 7. [`serializer`] - Writes each variant's document as YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use xmldoc_openapi::{
//!     generator::{GenerationInput, OpenApiGenerator},
//!     scanner::load_type_sources,
//!     serializer::{serialize_document, SerializationOptions},
//!     settings::GenerationSettings,
//! };
//! use std::path::PathBuf;
//!
//! let catalog = load_type_sources(&[PathBuf::from("./contracts")]).unwrap();
//! let input = GenerationInput::load(
//!     &[PathBuf::from("Contoso.Api.xml")],
//!     None,
//!     GenerationSettings::default(),
//! )
//! .unwrap();
//!
//! let output = OpenApiGenerator::new(&catalog).generate(&input);
//! for error in output.diagnostic.failed_operations().flat_map(|op| &op.errors) {
//!     eprintln!("{}", error.message);
//! }
//! let document = output.default_document().unwrap();
//! println!("{}", serialize_document(document, &SerializationOptions::default()).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod classifier;
pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod filters;
pub mod generator;
pub mod naming;
pub mod openapi;
pub mod parser;
pub mod scanner;
pub mod schema_registry;
pub mod serializer;
pub mod settings;
pub mod type_resolver;
pub mod variant;
pub mod xml;
