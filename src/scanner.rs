use crate::parser::ContractParser;
use crate::type_resolver::TypeCatalog;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds type sources below a file or directory.
///
/// A type source is either a Rust contract file (`.rs`) or a type manifest (`.yaml`, `.yml`,
/// `.json`). Directories are walked recursively; the `target` directory and hidden directories
/// (those starting with `.`) are skipped.
///
/// # Example
///
/// ```no_run
/// use xmldoc_openapi::scanner::TypeSourceScanner;
/// use std::path::PathBuf;
///
/// let scanner = TypeSourceScanner::new(PathBuf::from("./contracts"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct TypeSourceScanner {
    root_path: PathBuf,
}

/// Type sources discovered by a scan
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Rust contract files
    pub rust_files: Vec<PathBuf>,
    /// YAML and JSON type manifests
    pub manifest_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.rust_files.is_empty() && self.manifest_files.is_empty()
    }
}

enum SourceKind {
    Rust,
    Manifest,
}

fn source_kind(path: &Path) -> Option<SourceKind> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("rs") => Some(SourceKind::Rust),
        Some("yaml" | "yml" | "json") => Some(SourceKind::Manifest),
        _ => None,
    }
}

impl TypeSourceScanner {
    /// Creates a scanner rooted at a directory or a single source file.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The directory to scan, or one type source file
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects every type source below the root.
    ///
    /// Inaccessible entries are recorded as warnings and the scan continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist, or if it is a file that is not a type source.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.exists() {
            bail!("Type source not found: {}", self.root_path.display());
        }

        let mut result = ScanResult::default();
        if self.root_path.is_file() {
            match source_kind(&self.root_path) {
                Some(SourceKind::Rust) => result.rust_files.push(self.root_path.clone()),
                Some(SourceKind::Manifest) => result.manifest_files.push(self.root_path.clone()),
                None => bail!(
                    "Unsupported type source {} (expected .rs, .yaml, .yml or .json)",
                    self.root_path.display()
                ),
            }
            return Ok(result);
        }

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) if entry.file_type().is_file() => match source_kind(entry.path()) {
                    Some(SourceKind::Rust) => result.rust_files.push(entry.path().to_path_buf()),
                    Some(SourceKind::Manifest) => {
                        result.manifest_files.push(entry.path().to_path_buf())
                    }
                    None => {}
                },
                Ok(_) => {}
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} Rust files, {} manifests",
            self.root_path.display(),
            result.rust_files.len(),
            result.manifest_files.len()
        );
        Ok(result)
    }
}

/// Builds a [`TypeCatalog`] from type source files and directories.
///
/// Rust files that fail to parse are skipped with a warning so that one broken contract does not
/// hide the rest. A manifest that cannot be read is an error.
///
/// # Errors
///
/// Returns an error if a path cannot be scanned or a manifest cannot be loaded.
pub fn load_type_sources(paths: &[PathBuf]) -> Result<TypeCatalog> {
    let mut catalog = TypeCatalog::new();
    for path in paths {
        let scan = TypeSourceScanner::new(path.clone()).scan()?;
        if scan.is_empty() {
            warn!("No type sources found in {}", path.display());
        }

        for manifest in &scan.manifest_files {
            catalog
                .load_manifest(manifest)
                .with_context(|| format!("Failed to load type manifest: {}", manifest.display()))?;
        }
        for parsed in ContractParser::parse_files(&scan.rust_files)
            .into_iter()
            .flatten()
        {
            for definition in parsed.definitions {
                catalog.add_definition(definition);
            }
        }
    }
    info!("Loaded {} type definitions", catalog.len());
    Ok(catalog)
}
