use super::{DocumentMap, PostProcessingDocumentFilter, PostProcessingFilterSettings};
use crate::diagnostics::GenerationStatus;
use crate::openapi::OperationType;
use log::debug;

/// Removes operations whose generation failed; a path left without operations goes too
pub struct RemoveFailedGenerationOperationFilter;

impl PostProcessingDocumentFilter for RemoveFailedGenerationOperationFilter {
    fn apply(
        &self,
        documents: &mut DocumentMap,
        settings: Option<&PostProcessingFilterSettings<'_>>,
    ) {
        let Some(settings) = settings else {
            return;
        };

        for diagnostic in settings
            .operation_diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.generation_status == GenerationStatus::Failure)
        {
            let Some(operation_type) = OperationType::from_verb(&diagnostic.operation_method) else {
                continue;
            };
            for document in documents.values_mut() {
                let Some(path_item) = document.paths.get_mut(&diagnostic.path) else {
                    continue;
                };
                if !path_item.operations.contains_key(&operation_type) {
                    continue;
                }
                if path_item.operations.len() == 1 {
                    debug!("Removing path {} with its only failed operation", diagnostic.path);
                    document.paths.shift_remove(&diagnostic.path);
                } else {
                    debug!("Removing failed operation {} {}", operation_type, diagnostic.path);
                    path_item.operations.shift_remove(&operation_type);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::OperationGenerationDiagnostic;
    use crate::openapi::{OpenApiDocument, Operation};
    use crate::variant::DocumentVariantInfo;

    fn document_with(operations: &[(&str, OperationType)]) -> DocumentMap {
        let mut document = OpenApiDocument::new("3.0.1");
        for (path, operation_type) in operations {
            document
                .paths
                .entry(path.to_string())
                .or_default()
                .operations
                .insert(*operation_type, Operation::default());
        }
        let mut documents = DocumentMap::new();
        documents.insert(DocumentVariantInfo::default(), document);
        documents
    }

    fn failed(path: &str, method: &str) -> OperationGenerationDiagnostic {
        OperationGenerationDiagnostic {
            path: path.to_string(),
            operation_method: method.to_string(),
            generation_status: GenerationStatus::Failure,
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_sole_failed_operation_removes_path() {
        let mut documents =
            document_with(&[("/a", OperationType::Get), ("/b", OperationType::Get)]);
        let diagnostics = vec![failed("/a", "get")];

        RemoveFailedGenerationOperationFilter.apply(
            &mut documents,
            Some(&PostProcessingFilterSettings {
                operation_diagnostics: &diagnostics,
            }),
        );

        let paths: Vec<_> = documents[0].paths.keys().cloned().collect();
        assert_eq!(paths, vec!["/b".to_string()]);
    }

    #[test]
    fn test_failed_operation_among_others_removes_method_only() {
        let mut documents =
            document_with(&[("/a", OperationType::Get), ("/a", OperationType::Post)]);
        let diagnostics = vec![failed("/a", "post")];

        RemoveFailedGenerationOperationFilter.apply(
            &mut documents,
            Some(&PostProcessingFilterSettings {
                operation_diagnostics: &diagnostics,
            }),
        );

        let operations = &documents[0].paths["/a"].operations;
        assert_eq!(operations.len(), 1);
        assert!(operations.contains_key(&OperationType::Get));
    }

    #[test]
    fn test_missing_settings_or_documents_is_a_no_op() {
        let mut documents = document_with(&[("/a", OperationType::Get)]);
        RemoveFailedGenerationOperationFilter.apply(&mut documents, None);
        assert_eq!(documents[0].paths.len(), 1);

        let mut empty = DocumentMap::new();
        let diagnostics = vec![failed("/a", "get")];
        RemoveFailedGenerationOperationFilter.apply(
            &mut empty,
            Some(&PostProcessingFilterSettings {
                operation_diagnostics: &diagnostics,
            }),
        );
        assert!(empty.is_empty());
    }
}
