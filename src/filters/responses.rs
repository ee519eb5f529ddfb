use super::{
    documented_type, example_value, non_empty_text, OperationFilter, OperationFilterSettings,
};
use crate::error::FilterError;
use crate::openapi::{Header, MediaType, Operation, Response, Schema};
use crate::xml::XmlElement;
use log::debug;

/// Description of the synthetic response added when none is documented
pub const MISSING_RESPONSES_DESCRIPTION: &str = "Cannot locate responses in the documentation!";

/// Child tags that are not part of a response's description
const NON_DESCRIPTION_TAGS: [&str; 3] = ["see", "example", "header"];

/// `<response code="...">` tags become operation responses.
///
/// Responses sharing a code are merged: the first description wins, and a second, different
/// schema for the same content type is folded into an `anyOf`.
pub struct ResponseToResponseFilter;

impl ResponseToResponseFilter {
    fn merge_schema(media: &mut MediaType, schema: Schema) {
        match media.schema.as_mut() {
            None => media.schema = Some(schema),
            Some(existing) if !existing.any_of.is_empty() => {
                if !existing.any_of.contains(&schema) {
                    existing.any_of.push(schema);
                }
            }
            Some(existing) if *existing != schema => {
                let first = std::mem::take(existing);
                existing.any_of = vec![first, schema];
            }
            Some(_) => {}
        }
    }

    fn apply_headers(
        response: &mut Response,
        element: &XmlElement,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError> {
        for header in element.elements_named("header") {
            let Some(name) = header.attribute("name") else {
                return Err(FilterError::MissingAttribute {
                    element: "header".to_string(),
                    attribute: "name".to_string(),
                });
            };
            if response.headers.contains_key(name) {
                continue;
            }
            let schema = match documented_type(header, settings.registry.resolver())? {
                Some(descriptor) => settings.registry.find_or_add_reference(Some(&descriptor)),
                None => Schema::of_type("string", None),
            };
            response.headers.insert(
                name.to_string(),
                Header {
                    description: non_empty_text(header, &["see"]),
                    schema: Some(schema),
                },
            );
        }
        Ok(())
    }
}

impl OperationFilter for ResponseToResponseFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError> {
        let mut documented = 0;
        for tag in element.elements_named("response") {
            let code = tag
                .attribute("code")
                .ok_or_else(|| FilterError::MissingAttribute {
                    element: "response".to_string(),
                    attribute: "code".to_string(),
                })?
                .trim()
                .to_string();
            documented += 1;

            let schema = documented_type(tag, settings.registry.resolver())?
                .map(|descriptor| settings.registry.find_or_add_reference(Some(&descriptor)));
            let content_type = tag
                .attribute("contentType")
                .unwrap_or(settings.settings.default_content_type.as_str())
                .to_string();
            let example = example_value(tag);

            let response = operation.responses.entry(code.clone()).or_default();
            if response.description.is_empty() {
                if let Some(description) = non_empty_text(tag, &NON_DESCRIPTION_TAGS) {
                    response.description = description;
                }
            }
            if schema.is_some() || example.is_some() {
                let media = response.content.entry(content_type).or_default();
                if let Some(schema) = schema {
                    debug!("Adding schema to response {}", code);
                    Self::merge_schema(media, schema);
                }
                if media.example.is_none() {
                    media.example = example;
                }
            }
            Self::apply_headers(response, tag, settings)?;
        }

        if documented == 0 && operation.responses.is_empty() {
            operation.responses.insert(
                "default".to_string(),
                Response {
                    description: MISSING_RESPONSES_DESCRIPTION.to_string(),
                    ..Response::default()
                },
            );
        }
        Ok(())
    }
}
