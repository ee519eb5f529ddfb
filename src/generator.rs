//! The generation orchestrator.
//!
//! Drives every documented operation through preprocessing, the operation filters and the
//! operation config filters once per document variant it belongs to, then runs the document,
//! document config and post-processing phases over the assembled documents.

use crate::diagnostics::{
    GenerationDiagnostic, GenerationError, GenerationStatus, OperationGenerationDiagnostic,
    NO_OPERATIONS_MESSAGE,
};
use crate::error::{FilterError, Result};
use crate::filters::config::categorizer_names;
use crate::filters::preprocessing::path_template_parameters;
use crate::filters::{
    DocumentFilterSettings, DocumentMap, FilterConfig, OperationFilterSettings,
    PostProcessingFilterSettings,
};
use crate::openapi::{OpenApiDocument, Operation, OperationType, ParameterLocation};
use crate::schema_registry::SchemaReferenceRegistry;
use crate::settings::GenerationSettings;
use crate::type_resolver::TypeResolver;
use crate::variant::DocumentVariantInfo;
use crate::xml::XmlElement;
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::Url;

/// Everything one generation run reads
#[derive(Debug, Clone, Default)]
pub struct GenerationInput {
    /// Annotation XML documents (`<doc><members>...`)
    pub xml_documents: Vec<XmlElement>,
    /// Optional advanced configuration (`<configuration><document/><operation/>`)
    pub advanced_configuration: Option<XmlElement>,
    pub settings: GenerationSettings,
}

impl GenerationInput {
    pub fn new(xml_documents: Vec<XmlElement>) -> Self {
        Self {
            xml_documents,
            ..Self::default()
        }
    }

    pub fn with_configuration(mut self, configuration: XmlElement) -> Self {
        self.advanced_configuration = Some(configuration);
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Loads the annotation XML files and the optional configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read or is not well-formed XML.
    pub fn load(
        xml_paths: &[PathBuf],
        configuration: Option<&Path>,
        settings: GenerationSettings,
    ) -> Result<Self> {
        let xml_documents = xml_paths
            .iter()
            .map(|path| XmlElement::from_file(path))
            .collect::<Result<Vec<_>>>()?;
        let advanced_configuration = configuration.map(XmlElement::from_file).transpose()?;
        Ok(Self {
            xml_documents,
            advanced_configuration,
            settings,
        })
    }

    /// Section of the configuration named `name`; the configuration root itself may be it
    fn configuration_section(&self, name: &str) -> Option<&XmlElement> {
        let configuration = self.advanced_configuration.as_ref()?;
        if configuration.name == name {
            Some(configuration)
        } else {
            configuration.first_element(name)
        }
    }
}

/// Documents and diagnostics produced by a run
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub documents: DocumentMap,
    pub diagnostic: GenerationDiagnostic,
}

impl GenerationOutput {
    pub fn status(&self) -> GenerationStatus {
        self.diagnostic.overall_status()
    }

    /// Document of the variant every operation belongs to
    pub fn default_document(&self) -> Option<&OpenApiDocument> {
        self.documents.get(&DocumentVariantInfo::default())
    }

    pub fn document(&self, categorizer: &str, title: &str) -> Option<&OpenApiDocument> {
        self.documents.get(&DocumentVariantInfo::new(categorizer, title))
    }
}

/// Per-run state shared by the operations
struct RunState<'r> {
    registries: IndexMap<DocumentVariantInfo, SchemaReferenceRegistry<'r>>,
    documents: DocumentMap,
    seen: HashSet<(String, OperationType)>,
}

/// Generates OpenAPI documents from annotation XML
pub struct OpenApiGenerator<'r> {
    resolver: &'r dyn TypeResolver,
    filters: FilterConfig,
}

impl<'r> OpenApiGenerator<'r> {
    /// Generator with the default filter set
    pub fn new(resolver: &'r dyn TypeResolver) -> Self {
        Self::with_filters(resolver, FilterConfig::default())
    }

    pub fn with_filters(resolver: &'r dyn TypeResolver, filters: FilterConfig) -> Self {
        Self { resolver, filters }
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// Runs every phase over `input`.
    ///
    /// Never fails as a whole: per-operation problems end up in the operation diagnostics, and
    /// document-level problems (including variant attribute conflicts) in the document
    /// diagnostic.
    pub fn generate(&self, input: &GenerationInput) -> GenerationOutput {
        let settings = &input.settings;
        let config_document = input.configuration_section("document");
        let config_operation = input.configuration_section("operation");
        let categorizers = config_document.map(categorizer_names).unwrap_or_default();

        let members: Vec<&XmlElement> = input
            .xml_documents
            .iter()
            .flat_map(|doc| doc.descendants_named("member"))
            .filter(|member| {
                member.first_element("url").is_some() && member.first_element("verb").is_some()
            })
            .collect();

        let mut diagnostic = GenerationDiagnostic::default();
        if members.is_empty() {
            info!("{}", NO_OPERATIONS_MESSAGE);
            diagnostic
                .document_generation_diagnostic
                .errors
                .push(GenerationError::new(NO_OPERATIONS_MESSAGE, None));
            return GenerationOutput {
                documents: DocumentMap::new(),
                diagnostic,
            };
        }
        info!("Generating {} operation(s)", members.len());

        let mut state = RunState {
            registries: IndexMap::new(),
            documents: DocumentMap::new(),
            seen: HashSet::new(),
        };
        for member in members {
            let operation_diagnostic = self.generate_operation(
                member,
                &categorizers,
                config_operation,
                settings,
                &mut state,
            );
            diagnostic.operation_generation_diagnostics.push(operation_diagnostic);
        }

        let RunState {
            registries,
            mut documents,
            ..
        } = state;

        for (variant, document) in documents.iter_mut() {
            if let Some(registry) = registries.get(variant) {
                document.components.schemas = registry.references();
            }
            let context = DocumentFilterSettings {
                variant,
                resolver: self.resolver,
                settings,
            };
            for error in self
                .filters
                .apply_document_filters(document, &input.xml_documents, &context)
            {
                diagnostic
                    .document_generation_diagnostic
                    .record(error, GenerationStatus::Warning);
            }
        }

        if let Some(config_document) = config_document {
            match self.filters.apply_document_config_filters(
                &mut documents,
                config_document,
                &input.xml_documents,
                settings,
            ) {
                Ok(errors) => {
                    for error in errors {
                        diagnostic
                            .document_generation_diagnostic
                            .record(error, GenerationStatus::Warning);
                    }
                }
                Err(conflict) => {
                    warn!("{}", conflict);
                    diagnostic
                        .document_generation_diagnostic
                        .record(GenerationError::from(&conflict), GenerationStatus::Failure);
                }
            }
        }

        let post_processing = PostProcessingFilterSettings {
            operation_diagnostics: &diagnostic.operation_generation_diagnostics,
        };
        self.filters
            .apply_post_processing_filters(&mut documents, Some(&post_processing));

        info!(
            "Generated {} document(s), status {:?}",
            documents.len(),
            diagnostic.overall_status()
        );
        GenerationOutput {
            documents,
            diagnostic,
        }
    }

    fn generate_operation(
        &self,
        member: &XmlElement,
        categorizers: &[String],
        config_operation: Option<&XmlElement>,
        settings: &GenerationSettings,
        state: &mut RunState<'r>,
    ) -> OperationGenerationDiagnostic {
        let verb = member
            .first_element("verb")
            .map(|verb| verb.text().trim().to_string())
            .unwrap_or_default();
        let url = member
            .first_element("url")
            .map(|url| url.text().trim().to_string())
            .unwrap_or_default();
        debug!(
            "Generating operation {} {} ({})",
            verb,
            url,
            member.attribute("name").unwrap_or("<unnamed>")
        );

        let path = match operation_path(&url) {
            Ok(path) => path,
            Err(error) => {
                return OperationGenerationDiagnostic::from_errors(&url, &verb, vec![error.into()])
            }
        };
        let Some(operation_type) = OperationType::from_verb(&verb) else {
            let error = FilterError::InvalidVerb {
                verb: verb.clone(),
                member: member.attribute("name").unwrap_or_default().to_string(),
            };
            return OperationGenerationDiagnostic::from_errors(&path, &verb, vec![error.into()]);
        };

        if !state.seen.insert((path.clone(), operation_type)) {
            warn!("Operation {} {} is documented more than once", operation_type, path);
            let error = FilterError::DuplicateOperation {
                path: path.clone(),
                method: operation_type.to_string(),
            };
            return OperationGenerationDiagnostic {
                path,
                operation_method: operation_type.to_string(),
                generation_status: GenerationStatus::Warning,
                errors: vec![error.into()],
            };
        }

        let mut element = member.clone();
        let mut errors = self.filters.preprocess(&mut element, settings);
        let operation_id = operation_id(&element, operation_type, &path);

        for variant in variants_of(&element, categorizers) {
            let registry = state
                .registries
                .entry(variant.clone())
                .or_insert_with(|| {
                    SchemaReferenceRegistry::new(self.resolver, settings.property_naming)
                });
            let mut context = OperationFilterSettings {
                registry,
                settings,
                path: &path,
                operation_type,
            };

            let mut operation = Operation {
                operation_id: Some(operation_id.clone()),
                ..Operation::default()
            };
            let mut variant_errors = self
                .filters
                .apply_operation_filters(&mut operation, &element, &mut context);
            if let Some(config_operation) = config_operation {
                variant_errors.extend(self.filters.apply_operation_config_filters(
                    &mut operation,
                    config_operation,
                    &mut context,
                ));
            }
            variant_errors.extend(
                undocumented_path_parameters(&operation, &path).map(GenerationError::from),
            );
            for error in variant_errors {
                if !errors.contains(&error) {
                    errors.push(error);
                }
            }

            state
                .documents
                .entry(variant)
                .or_insert_with(|| OpenApiDocument::new(&settings.openapi_version))
                .paths
                .entry(path.clone())
                .or_default()
                .operations
                .entry(operation_type)
                .or_insert(operation);
        }

        OperationGenerationDiagnostic::from_errors(&path, operation_type.as_str(), errors)
    }
}

/// Percent-decoded absolute path of an operation url
fn operation_path(url: &str) -> std::result::Result<String, FilterError> {
    let invalid = |message: String| FilterError::InvalidUrl {
        url: url.to_string(),
        message,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(invalid("not an absolute http url".to_string()));
    }
    urlencoding::decode(parsed.path())
        .map(|decoded| decoded.into_owned())
        .map_err(|e| invalid(e.to_string()))
}

/// `<operationId>` when documented, otherwise `verb_segment_segment`
fn operation_id(element: &XmlElement, operation_type: OperationType, path: &str) -> String {
    if let Some(documented) = element
        .first_element("operationId")
        .map(|id| id.text().trim().to_string())
        .filter(|id| !id.is_empty())
    {
        return documented;
    }
    let mut parts = vec![operation_type.as_str().to_string()];
    parts.extend(
        path.split('/')
            .map(|segment| segment.replace(['{', '}'], ""))
            .filter(|segment| !segment.is_empty()),
    );
    parts.join("_")
}

/// The default variant plus one variant per categorizer element on the operation
fn variants_of(element: &XmlElement, categorizers: &[String]) -> Vec<DocumentVariantInfo> {
    let mut variants = vec![DocumentVariantInfo::default()];
    for categorizer in categorizers {
        for tag in element.elements_named(categorizer) {
            let title = tag.text().trim().to_string();
            if title.is_empty() {
                continue;
            }
            let variant = DocumentVariantInfo::new(categorizer, &title);
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
    }
    variants
}

fn undocumented_path_parameters<'o>(
    operation: &'o Operation,
    path: &'o str,
) -> impl Iterator<Item = FilterError> + 'o {
    path_template_parameters(path)
        .into_iter()
        .filter(|name| operation.parameter(name, ParameterLocation::Path).is_none())
        .map(move |parameter| FilterError::UndocumentedPathParameter {
            parameter,
            path: path.to_string(),
        })
}
