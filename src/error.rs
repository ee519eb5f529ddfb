use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for loading inputs and writing outputs
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error in {}: {message}", file.display())]
    XmlParse { file: PathBuf, message: String },
    #[error("Type manifest error in {}: {message}", file.display())]
    Manifest { file: PathBuf, message: String },
}

/// Failure to turn a type name or a list of `cref` tokens into a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeLoadError {
    #[error("Type {0} could not be found in the loaded type sources")]
    UnknownType(String),
    #[error("Malformed type name {name}: {message}")]
    InvalidTypeName { name: String, message: String },
    #[error("Generic type {type_name} expects {expected} type argument(s), {found} documented")]
    UndocumentedGenericType {
        type_name: String,
        expected: usize,
        found: usize,
    },
    #[error("Generic type arguments are not in definition order: {tokens}")]
    IncorrectlyOrderedGenericType { tokens: String },
}

impl TypeLoadError {
    pub fn kind(&self) -> &'static str {
        match self {
            TypeLoadError::UnknownType(_) => "UnknownType",
            TypeLoadError::InvalidTypeName { .. } => "InvalidTypeName",
            TypeLoadError::UndocumentedGenericType { .. } => "UndocumentedGenericType",
            TypeLoadError::IncorrectlyOrderedGenericType { .. } => "IncorrectlyOrderedGenericType",
        }
    }
}

/// Recoverable failure raised while processing one operation or one document.
///
/// These never abort a generation run: the filter chain turns them into
/// [`GenerationError`](crate::diagnostics::GenerationError)s and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Invalid verb {verb} for operation {member}")]
    InvalidVerb { verb: String, member: String },
    #[error("Invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("Path parameter {parameter} is not documented for {path}")]
    UndocumentedPathParameter { parameter: String, path: String },
    #[error("<{element}> is missing the required attribute \"{attribute}\"")]
    MissingAttribute {
        element: String,
        attribute: String,
    },
    #[error("Latency value \"{value}\" for class {class} is not an integer")]
    InvalidLatencyValue { value: String, class: String },
    #[error("Operation {method} {path} is documented more than once")]
    DuplicateOperation { path: String, method: String },
    #[error(transparent)]
    TypeLoad(#[from] TypeLoadError),
}

impl FilterError {
    /// Name reported as the exception type of a generation error.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterError::InvalidVerb { .. } => "InvalidVerb",
            FilterError::InvalidUrl { .. } => "InvalidUrl",
            FilterError::UndocumentedPathParameter { .. } => "UndocumentedPathParameter",
            FilterError::MissingAttribute { .. } => "MissingAttribute",
            FilterError::InvalidLatencyValue { .. } => "InvalidLatencyValue",
            FilterError::DuplicateOperation { .. } => "DuplicateOperation",
            FilterError::TypeLoad(inner) => inner.kind(),
        }
    }
}

/// Two declarations of the same document variant disagree on their attributes.
///
/// Unlike [`FilterError`] this aborts the config element that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Conflicting attributes for variant {categorizer}/{title}: {existing} vs {conflicting}")]
pub struct VariantConflictError {
    pub title: String,
    pub categorizer: String,
    pub existing: String,
    pub conflicting: String,
}

impl VariantConflictError {
    pub fn kind(&self) -> &'static str {
        "ConflictingDocumentVariantAttributes"
    }
}
