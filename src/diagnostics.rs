//! Generation diagnostics returned next to the documents.

use crate::error::{FilterError, VariantConflictError};
use serde::{Deserialize, Serialize};

/// Message reported when the inputs document no operation at all
pub const NO_OPERATIONS_MESSAGE: &str =
    "No operation elements were found in the annotation XML documents.";

/// Outcome of generating one operation, one document, or the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GenerationStatus {
    #[default]
    Success,
    Warning,
    Failure,
}

/// A non-fatal error recorded during generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
}

impl GenerationError {
    pub fn new(message: impl Into<String>, exception_type: Option<&str>) -> Self {
        Self {
            message: message.into(),
            exception_type: exception_type.map(str::to_string),
        }
    }
}

impl From<&FilterError> for GenerationError {
    fn from(error: &FilterError) -> Self {
        Self::new(error.to_string(), Some(error.kind()))
    }
}

impl From<FilterError> for GenerationError {
    fn from(error: FilterError) -> Self {
        Self::from(&error)
    }
}

impl From<&VariantConflictError> for GenerationError {
    fn from(error: &VariantConflictError) -> Self {
        Self::new(error.to_string(), Some(error.kind()))
    }
}

/// Result of generating one operation (one path + method)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationGenerationDiagnostic {
    pub path: String,
    pub operation_method: String,
    pub generation_status: GenerationStatus,
    #[serde(default)]
    pub errors: Vec<GenerationError>,
}

impl OperationGenerationDiagnostic {
    /// Builds a diagnostic whose status follows from `errors`: failure when there are any.
    pub fn from_errors(path: &str, operation_method: &str, errors: Vec<GenerationError>) -> Self {
        let generation_status = if errors.is_empty() {
            GenerationStatus::Success
        } else {
            GenerationStatus::Failure
        };
        Self {
            path: path.to_string(),
            operation_method: operation_method.to_string(),
            generation_status,
            errors,
        }
    }
}

/// Result of the document-level phases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentGenerationDiagnostic {
    pub generation_status: GenerationStatus,
    #[serde(default)]
    pub errors: Vec<GenerationError>,
}

impl DocumentGenerationDiagnostic {
    /// Record an error, raising the status to at least `status`
    pub fn record(&mut self, error: GenerationError, status: GenerationStatus) {
        self.errors.push(error);
        self.generation_status = self.generation_status.max(status);
    }
}

/// Everything a generation run reports besides the documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationDiagnostic {
    pub document_generation_diagnostic: DocumentGenerationDiagnostic,
    #[serde(default)]
    pub operation_generation_diagnostics: Vec<OperationGenerationDiagnostic>,
}

impl GenerationDiagnostic {
    /// Overall run status.
    ///
    /// Failure when every operation failed or the document phase failed (a variant conflict),
    /// warning when anything else went wrong, success otherwise.
    pub fn overall_status(&self) -> GenerationStatus {
        let operations = &self.operation_generation_diagnostics;
        let failed = operations
            .iter()
            .filter(|diagnostic| diagnostic.generation_status == GenerationStatus::Failure)
            .count();

        if self.document_generation_diagnostic.generation_status == GenerationStatus::Failure
            || (!operations.is_empty() && failed == operations.len())
        {
            return GenerationStatus::Failure;
        }

        let worst_operation = operations
            .iter()
            .map(|diagnostic| diagnostic.generation_status)
            .max()
            .unwrap_or_default();
        if failed > 0 || worst_operation == GenerationStatus::Warning {
            return GenerationStatus::Warning;
        }
        self.document_generation_diagnostic.generation_status
    }

    /// Diagnostics of operations that failed
    pub fn failed_operations(&self) -> impl Iterator<Item = &OperationGenerationDiagnostic> {
        self.operation_generation_diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.generation_status == GenerationStatus::Failure)
    }
}
