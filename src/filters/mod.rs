//! The ordered filter pipeline.
//!
//! Each phase is a list of trait objects run in order by the orchestrator:
//!
//! 1. [`PreprocessingOperationFilter`] rewrites an operation's XML in place
//! 2. [`OperationFilter`] fills one in-progress [`Operation`] from its XML
//! 3. [`OperationConfigFilter`] applies the advanced configuration to an operation
//! 4. [`DocumentFilter`] fills one document from the whole XML documentation
//! 5. [`DocumentConfigFilter`] applies the advanced configuration across all documents
//! 6. [`PostProcessingDocumentFilter`] cleans up the finished documents
//!
//! Filters never overwrite a value that is already set, so whatever is seen first wins. A
//! failing filter never stops its siblings: the chain runners turn the error into a
//! [`GenerationError`] and move on.

pub mod config;
pub mod document;
pub mod latency;
pub mod operation;
pub mod parameters;
pub mod post_processing;
pub mod preprocessing;
pub mod responses;

use crate::diagnostics::{GenerationError, OperationGenerationDiagnostic};
use crate::error::{FilterError, VariantConflictError};
use crate::openapi::{OpenApiDocument, Operation, OperationType};
use crate::schema_registry::SchemaReferenceRegistry;
use crate::settings::GenerationSettings;
use crate::type_resolver::{TypeDescriptor, TypeResolver};
use crate::variant::DocumentVariantInfo;
use crate::xml::XmlElement;
use indexmap::IndexMap;
use log::warn;

pub use config::{CommonAnnotationFilter, DocumentVariantAttributesFilter};
pub use document::{
    AssemblyNameToInfoFilter, MemberSummaryToSchemaDescriptionFilter, UrlToServerFilter,
};
pub use latency::LatencyToExtensionFilter;
pub use operation::{GroupToTagFilter, RemarksToDescriptionFilter, SummaryToSummaryFilter};
pub use parameters::{ParamToParameterFilter, ParamToRequestBodyFilter};
pub use post_processing::RemoveFailedGenerationOperationFilter;
pub use preprocessing::{ConvertAlternativeParamTagsFilter, PopulateInAttributeFilter};
pub use responses::ResponseToResponseFilter;

/// Generated documents keyed by variant
pub type DocumentMap = IndexMap<DocumentVariantInfo, OpenApiDocument>;

/// Context handed to every operation filter
pub struct OperationFilterSettings<'a, 'r> {
    /// Registry of the variant the operation is generated for
    pub registry: &'a mut SchemaReferenceRegistry<'r>,
    pub settings: &'a GenerationSettings,
    pub path: &'a str,
    pub operation_type: OperationType,
}

/// Context handed to every document filter
pub struct DocumentFilterSettings<'a> {
    pub variant: &'a DocumentVariantInfo,
    pub resolver: &'a dyn TypeResolver,
    pub settings: &'a GenerationSettings,
}

/// Context handed to the post-processing filters
pub struct PostProcessingFilterSettings<'a> {
    pub operation_diagnostics: &'a [OperationGenerationDiagnostic],
}

/// Rewrites an operation's XML before any operation filter reads it
pub trait PreprocessingOperationFilter {
    fn apply(
        &self,
        element: &mut XmlElement,
        settings: &GenerationSettings,
    ) -> Result<(), FilterError>;
}

/// Fills part of an operation from its XML element
pub trait OperationFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError>;
}

/// Applies the `<operation>` section of the advanced configuration to one operation.
///
/// Receives the regular filter chains so that configured annotations go through the same
/// preprocessing and operation filters as the operation's own documentation.
pub trait OperationConfigFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        config_operation_element: &XmlElement,
        filters: &FilterConfig,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Vec<GenerationError>;
}

/// Fills part of a document from the whole XML documentation
pub trait DocumentFilter {
    fn apply(
        &self,
        document: &mut OpenApiDocument,
        xml_documents: &[XmlElement],
        settings: &DocumentFilterSettings<'_>,
    ) -> Result<(), FilterError>;
}

/// Applies the `<document>` section of the advanced configuration across all documents
pub trait DocumentConfigFilter {
    fn apply(
        &self,
        documents: &mut DocumentMap,
        config_document_element: &XmlElement,
        xml_documents: &[XmlElement],
        settings: &GenerationSettings,
    ) -> Result<Vec<GenerationError>, VariantConflictError>;
}

/// Final cleanup of the finished documents
pub trait PostProcessingDocumentFilter {
    fn apply(
        &self,
        documents: &mut DocumentMap,
        settings: Option<&PostProcessingFilterSettings<'_>>,
    );
}

/// The filter set of a generation run, one ordered list per phase
pub struct FilterConfig {
    pub preprocessing: Vec<Box<dyn PreprocessingOperationFilter>>,
    pub operation: Vec<Box<dyn OperationFilter>>,
    pub operation_config: Vec<Box<dyn OperationConfigFilter>>,
    pub document: Vec<Box<dyn DocumentFilter>>,
    pub document_config: Vec<Box<dyn DocumentConfigFilter>>,
    pub post_processing: Vec<Box<dyn PostProcessingDocumentFilter>>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            preprocessing: vec![
                Box::new(ConvertAlternativeParamTagsFilter),
                Box::new(PopulateInAttributeFilter),
            ],
            operation: vec![
                Box::new(GroupToTagFilter),
                Box::new(SummaryToSummaryFilter),
                Box::new(RemarksToDescriptionFilter),
                Box::new(ParamToParameterFilter),
                Box::new(ParamToRequestBodyFilter),
                Box::new(ResponseToResponseFilter),
                Box::new(LatencyToExtensionFilter),
            ],
            operation_config: vec![Box::new(CommonAnnotationFilter)],
            document: vec![
                Box::new(AssemblyNameToInfoFilter),
                Box::new(UrlToServerFilter),
                Box::new(MemberSummaryToSchemaDescriptionFilter),
            ],
            document_config: vec![Box::new(DocumentVariantAttributesFilter)],
            post_processing: vec![Box::new(RemoveFailedGenerationOperationFilter)],
        }
    }
}

impl FilterConfig {
    /// A config with every phase empty
    pub fn empty() -> Self {
        Self {
            preprocessing: Vec::new(),
            operation: Vec::new(),
            operation_config: Vec::new(),
            document: Vec::new(),
            document_config: Vec::new(),
            post_processing: Vec::new(),
        }
    }

    /// Runs the preprocessing filters over `element`, collecting every error.
    pub fn preprocess(
        &self,
        element: &mut XmlElement,
        settings: &GenerationSettings,
    ) -> Vec<GenerationError> {
        collect_errors(
            self.preprocessing
                .iter()
                .map(|filter| filter.apply(element, settings)),
        )
    }

    /// Runs the operation filters in order, collecting every error.
    pub fn apply_operation_filters(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Vec<GenerationError> {
        collect_errors(
            self.operation
                .iter()
                .map(|filter| filter.apply(operation, element, settings)),
        )
    }

    pub fn apply_operation_config_filters(
        &self,
        operation: &mut Operation,
        config_operation_element: &XmlElement,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Vec<GenerationError> {
        self.operation_config
            .iter()
            .flat_map(|filter| filter.apply(operation, config_operation_element, self, settings))
            .collect()
    }

    pub fn apply_document_filters(
        &self,
        document: &mut OpenApiDocument,
        xml_documents: &[XmlElement],
        settings: &DocumentFilterSettings<'_>,
    ) -> Vec<GenerationError> {
        collect_errors(
            self.document
                .iter()
                .map(|filter| filter.apply(document, xml_documents, settings)),
        )
    }

    /// Runs the document config filters; the first variant conflict aborts the phase.
    ///
    /// # Errors
    ///
    /// Returns the [`VariantConflictError`] raised by a filter.
    pub fn apply_document_config_filters(
        &self,
        documents: &mut DocumentMap,
        config_document_element: &XmlElement,
        xml_documents: &[XmlElement],
        settings: &GenerationSettings,
    ) -> Result<Vec<GenerationError>, VariantConflictError> {
        let mut errors = Vec::new();
        for filter in &self.document_config {
            errors.extend(filter.apply(
                documents,
                config_document_element,
                xml_documents,
                settings,
            )?);
        }
        Ok(errors)
    }

    pub fn apply_post_processing_filters(
        &self,
        documents: &mut DocumentMap,
        settings: Option<&PostProcessingFilterSettings<'_>>,
    ) {
        for filter in &self.post_processing {
            filter.apply(documents, settings);
        }
    }
}

fn collect_errors(results: impl Iterator<Item = Result<(), FilterError>>) -> Vec<GenerationError> {
    results
        .filter_map(|result| match result {
            Ok(()) => None,
            Err(error) => {
                warn!("Filter failed: {}", error);
                Some(GenerationError::from(&error))
            }
        })
        .collect()
}

/// `cref` tokens documented on a tag: its `cref` attribute, else its `<see cref>` children
pub(crate) fn reference_tokens(element: &XmlElement) -> Vec<String> {
    match element.attribute("cref") {
        Some(cref) => vec![cref.to_string()],
        None => element.see_crefs(),
    }
}

/// Type documented on a tag, `None` when the tag documents no type
pub(crate) fn documented_type(
    element: &XmlElement,
    resolver: &dyn TypeResolver,
) -> Result<Option<TypeDescriptor>, FilterError> {
    let tokens = reference_tokens(element);
    if tokens.is_empty() {
        return Ok(None);
    }
    Ok(Some(resolver.load_type_from_reference_tokens(&tokens)?))
}

/// Example payload of a tag's `<example>` child, as JSON when it parses as JSON
pub(crate) fn example_value(element: &XmlElement) -> Option<serde_json::Value> {
    let example = element.first_element("example")?;
    let text = example.text();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    )
}

/// Display text of a tag, or `None` when it is blank
pub(crate) fn non_empty_text(element: &XmlElement, skip: &[&str]) -> Option<String> {
    let text = element.display_text(skip);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::naming::PropertyNaming;
    use crate::type_resolver::{PropertyDefinition, TypeCatalog, TypeDefinition};

    pub fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.add_definition(TypeDefinition {
            name: "Contoso.SampleObject".to_string(),
            properties: vec![
                PropertyDefinition::new("Name", "System.String"),
                PropertyDefinition::new("Count", "System.Int32"),
            ],
            ..TypeDefinition::default()
        });
        catalog.add_definition(TypeDefinition {
            name: "Contoso.Page".to_string(),
            generic_parameters: vec!["T".to_string()],
            properties: vec![PropertyDefinition::new(
                "Items",
                "System.Collections.Generic.List`1[T]",
            )],
            ..TypeDefinition::default()
        });
        catalog
    }

    pub fn registry(catalog: &TypeCatalog) -> SchemaReferenceRegistry<'_> {
        SchemaReferenceRegistry::new(catalog, PropertyNaming::Default)
    }

    pub fn member(xml: &str) -> XmlElement {
        XmlElement::parse(xml).unwrap()
    }

    /// Run one operation filter against a fresh context
    pub fn run(
        filter: &dyn OperationFilter,
        operation: &mut Operation,
        xml: &str,
        registry: &mut SchemaReferenceRegistry<'_>,
    ) -> Result<(), FilterError> {
        let settings = GenerationSettings::default();
        let mut context = OperationFilterSettings {
            registry,
            settings: &settings,
            path: "/samples/{id}",
            operation_type: OperationType::Get,
        };
        filter.apply(operation, &member(xml), &mut context)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    struct AlwaysFails;

    impl OperationFilter for AlwaysFails {
        fn apply(
            &self,
            _operation: &mut Operation,
            _element: &XmlElement,
            settings: &mut OperationFilterSettings<'_, '_>,
        ) -> Result<(), FilterError> {
            Err(FilterError::InvalidUrl {
                url: settings.path.to_string(),
                message: "always".to_string(),
            })
        }
    }

    #[test]
    fn test_chain_keeps_running_after_errors() {
        let catalog = catalog();
        let mut registry = registry(&catalog);
        let settings = GenerationSettings::default();
        let mut context = OperationFilterSettings {
            registry: &mut registry,
            settings: &settings,
            path: "/samples",
            operation_type: OperationType::Get,
        };
        let filters = FilterConfig {
            operation: vec![
                Box::new(AlwaysFails),
                Box::new(SummaryToSummaryFilter),
                Box::new(AlwaysFails),
            ],
            ..FilterConfig::empty()
        };

        let mut operation = Operation::default();
        let errors = filters.apply_operation_filters(
            &mut operation,
            &member("<member><summary>Still applied</summary></member>"),
            &mut context,
        );

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].exception_type.as_deref(), Some("InvalidUrl"));
        assert_eq!(operation.summary.as_deref(), Some("Still applied"));
    }

    #[test]
    fn test_default_order() {
        let filters = FilterConfig::default();
        assert_eq!(filters.preprocessing.len(), 2);
        assert_eq!(filters.operation.len(), 7);
        assert_eq!(filters.document.len(), 3);
        assert_eq!(filters.document_config.len(), 1);
        assert_eq!(filters.post_processing.len(), 1);
    }

    #[test]
    fn test_example_value() {
        let json = member(r#"<param><example>{"name":"a"}</example></param>"#);
        assert_eq!(example_value(&json), Some(serde_json::json!({ "name": "a" })));

        let text = member("<param><example>plain text</example></param>");
        assert_eq!(example_value(&text), Some(serde_json::json!("plain text")));

        assert_eq!(example_value(&member("<param/>")), None);
    }
}
