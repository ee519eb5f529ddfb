//! Filters driven by the advanced configuration XML.
//!
//! ```xml
//! <configuration>
//!   <document>
//!     <variant>
//!       <name>swagger</name>
//!       <options>
//!         <option version="2">v2</option>
//!       </options>
//!     </variant>
//!   </document>
//!   <operation>
//!     <annotation tag="Samples">
//!       <response code="500">Server error</response>
//!     </annotation>
//!   </operation>
//! </configuration>
//! ```

use super::{
    DocumentConfigFilter, DocumentMap, FilterConfig, OperationConfigFilter,
    OperationFilterSettings,
};
use crate::diagnostics::GenerationError;
use crate::error::VariantConflictError;
use crate::openapi::Operation;
use crate::settings::GenerationSettings;
use crate::variant::DocumentVariantInfo;
use crate::xml::XmlElement;
use indexmap::map::MutableKeys;
use log::debug;

/// Categorizer names declared by `<document><variant><name>` in the configuration
pub fn categorizer_names(config_document_element: &XmlElement) -> Vec<String> {
    config_document_element
        .elements_named("variant")
        .filter_map(|variant| variant.first_element("name"))
        .map(|name| name.text().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Fills in variant attributes and checks that every declaration of a variant agrees.
///
/// Attributes come from `<variant><options><option k="v">Title</option>` in the configuration
/// and from every `<categorizer k="v">Title</categorizer>` element in the annotation XML. Only
/// variants that already have a document are updated.
pub struct DocumentVariantAttributesFilter;

impl DocumentVariantAttributesFilter {
    fn merge(
        documents: &mut DocumentMap,
        declared: &DocumentVariantInfo,
    ) -> Result<(), VariantConflictError> {
        match documents.get_full_mut2(declared) {
            Some((_, variant, _)) => variant.merge_attributes(declared),
            None => {
                debug!("Variant {} has no document, ignoring its attributes", declared);
                Ok(())
            }
        }
    }

    fn declaration(categorizer: &str, element: &XmlElement) -> DocumentVariantInfo {
        DocumentVariantInfo::new(categorizer, element.text().trim())
            .with_attributes(element.attributes.clone())
    }
}

impl DocumentConfigFilter for DocumentVariantAttributesFilter {
    fn apply(
        &self,
        documents: &mut DocumentMap,
        config_document_element: &XmlElement,
        xml_documents: &[XmlElement],
        _settings: &GenerationSettings,
    ) -> Result<Vec<GenerationError>, VariantConflictError> {
        let mut errors = Vec::new();
        for variant in config_document_element.elements_named("variant") {
            let Some(categorizer) = variant
                .first_element("name")
                .map(|name| name.text().trim().to_string())
                .filter(|name| !name.is_empty())
            else {
                errors.push(GenerationError::new(
                    "A <variant> in the configuration has no <name>",
                    Some("InvalidConfiguration"),
                ));
                continue;
            };

            if let Some(options) = variant.first_element("options") {
                for option in options.elements_named("option") {
                    Self::merge(documents, &Self::declaration(&categorizer, option))?;
                }
            }
            for doc in xml_documents {
                for element in doc.descendants_named(&categorizer) {
                    Self::merge(documents, &Self::declaration(&categorizer, element))?;
                }
            }
        }
        Ok(errors)
    }
}

/// Applies `<operation><annotation>` bodies to every operation, or to the operations carrying
/// the annotation's `tag`.
///
/// Runs after the operation's own documentation, so the operation's own values win.
pub struct CommonAnnotationFilter;

impl OperationConfigFilter for CommonAnnotationFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        config_operation_element: &XmlElement,
        filters: &FilterConfig,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Vec<GenerationError> {
        let mut errors = Vec::new();
        for annotation in config_operation_element.elements_named("annotation") {
            if let Some(tag) = annotation.attribute("tag") {
                if !operation.tags.iter().any(|existing| existing == tag) {
                    continue;
                }
            }
            let mut element = annotation.clone();
            errors.extend(filters.preprocess(&mut element, settings.settings));
            errors.extend(filters.apply_operation_filters(operation, &element, settings));
        }
        errors
    }
}
