//! `<param>` tags: path, query, header and cookie parameters, and the request body.

use super::{
    documented_type, example_value, non_empty_text, OperationFilter, OperationFilterSettings,
};
use crate::error::FilterError;
use crate::openapi::{MediaType, Operation, Parameter, ParameterLocation, RequestBody, Schema};
use crate::xml::XmlElement;
use log::debug;

/// Child tags that are not part of a parameter's description
const NON_DESCRIPTION_TAGS: [&str; 2] = ["see", "example"];

fn required_attribute<'e>(
    element: &'e XmlElement,
    attribute: &str,
) -> Result<&'e str, FilterError> {
    element
        .attribute(attribute)
        .ok_or_else(|| FilterError::MissingAttribute {
            element: element.name.clone(),
            attribute: attribute.to_string(),
        })
}

/// `<param in="path|query|header|cookie">` becomes an operation parameter
pub struct ParamToParameterFilter;

impl OperationFilter for ParamToParameterFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError> {
        for param in element.elements_named("param") {
            let Some(location) = param.attribute("in").and_then(ParameterLocation::from_attribute)
            else {
                continue;
            };
            let name = required_attribute(param, "name")?;
            if operation.parameter(name, location).is_some() {
                debug!("Parameter {} is already documented, keeping the first", name);
                continue;
            }

            let schema = match documented_type(param, settings.registry.resolver())? {
                Some(descriptor) => settings.registry.find_or_add_reference(Some(&descriptor)),
                None => Schema::of_type("string", None),
            };
            let required = location == ParameterLocation::Path
                || param
                    .attribute("required")
                    .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));

            operation.parameters.push(Parameter {
                name: name.to_string(),
                location,
                description: non_empty_text(param, &NON_DESCRIPTION_TAGS),
                required,
                schema: Some(schema),
            });
        }
        Ok(())
    }
}

/// `<param in="body">` becomes the request body
pub struct ParamToRequestBodyFilter;

impl OperationFilter for ParamToRequestBodyFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError> {
        let Some(body) = element
            .elements_named("param")
            .find(|param| param.attribute("in") == Some("body"))
        else {
            return Ok(());
        };
        if operation.request_body.is_some() {
            return Ok(());
        }

        let schema = documented_type(body, settings.registry.resolver())?
            .map(|descriptor| settings.registry.find_or_add_reference(Some(&descriptor)));
        let content_type = body
            .attribute("contentType")
            .unwrap_or(settings.settings.default_content_type.as_str())
            .to_string();

        let mut request_body = RequestBody {
            description: non_empty_text(body, &NON_DESCRIPTION_TAGS),
            required: true,
            ..RequestBody::default()
        };
        request_body.content.insert(
            content_type,
            MediaType {
                schema,
                example: example_value(body),
            },
        );
        operation.request_body = Some(request_body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeLoadError;
    use crate::filters::test_support::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parameters_with_types_and_defaults() {
        let catalog = catalog();
        let mut registry = registry(&catalog);
        let mut operation = Operation::default();

        run(
            &ParamToParameterFilter,
            &mut operation,
            r#"<member>
                 <param name="id" in="path" cref="T:System.Int32">The id</param>
                 <param name="filter" in="query">Free text <see cref="T:System.String"/></param>
                 <param name="X-Trace" in="header" required="true">Trace id</param>
                 <param name="sample" in="body" cref="T:Contoso.SampleObject">Body</param>
                 <param name="untyped">No location</param>
               </member>"#,
            &mut registry,
        )
        .unwrap();

        assert_eq!(operation.parameters.len(), 3);
        let id = operation.parameter("id", ParameterLocation::Path).unwrap();
        assert!(id.required);
        assert_eq!(id.schema, Some(Schema::of_type("integer", Some("int32"))));
        assert_eq!(id.description.as_deref(), Some("The id"));

        let filter = operation.parameter("filter", ParameterLocation::Query).unwrap();
        assert!(!filter.required);
        assert_eq!(filter.description.as_deref(), Some("Free text"));

        let trace = operation.parameter("X-Trace", ParameterLocation::Header).unwrap();
        assert!(trace.required);
        assert_eq!(trace.schema, Some(Schema::of_type("string", None)));
    }

    #[test]
    fn test_first_documented_parameter_wins() {
        let catalog = catalog();
        let mut registry = registry(&catalog);
        let mut operation = Operation::default();

        run(
            &ParamToParameterFilter,
            &mut operation,
            r#"<member>
                 <param name="id" in="path">First</param>
                 <param name="id" in="path">Second</param>
               </member>"#,
            &mut registry,
        )
        .unwrap();

        assert_eq!(operation.parameters.len(), 1);
        assert_eq!(operation.parameters[0].description.as_deref(), Some("First"));
    }

    #[test]
    fn test_parameter_with_unknown_type() {
        let catalog = catalog();
        let mut registry = registry(&catalog);
        let mut operation = Operation::default();

        let error = run(
            &ParamToParameterFilter,
            &mut operation,
            r#"<member><param name="id" in="path" cref="T:Contoso.Missing">Id</param></member>"#,
            &mut registry,
        )
        .unwrap_err();

        assert_eq!(
            error,
            FilterError::TypeLoad(TypeLoadError::UnknownType("Contoso.Missing".to_string()))
        );
    }

    #[test]
    fn test_parameter_without_name() {
        let catalog = catalog();
        let mut registry = registry(&catalog);
        let mut operation = Operation::default();

        let error = run(
            &ParamToParameterFilter,
            &mut operation,
            r#"<member><param in="query">Nameless</param></member>"#,
            &mut registry,
        )
        .unwrap_err();
        assert_eq!(error.kind(), "MissingAttribute");
    }

    #[test]
    fn test_request_body_from_generic_see_tokens() {
        let catalog = catalog();
        let mut registry = registry(&catalog);
        let mut operation = Operation::default();

        run(
            &ParamToRequestBodyFilter,
            &mut operation,
            r#"<member>
                 <param name="page" in="body" contentType="application/xml">
                   A <see cref="T:Contoso.Page`1"/> of <see cref="T:Contoso.SampleObject"/>
                   <example>{"items": []}</example>
                 </param>
               </member>"#,
            &mut registry,
        )
        .unwrap();

        let body = operation.request_body.unwrap();
        assert!(body.required);
        assert_eq!(body.description.as_deref(), Some("A of"));
        let media = &body.content["application/xml"];
        assert_eq!(
            media.schema,
            Some(Schema::reference_to("Contoso.Page_Contoso.SampleObject_"))
        );
        assert_eq!(media.example, Some(serde_json::json!({ "items": [] })));
        assert!(registry.contains("Contoso.SampleObject"));
    }

    #[test]
    fn test_request_body_default_content_type_and_first_wins() {
        let catalog = catalog();
        let mut registry = registry(&catalog);
        let mut operation = Operation::default();
        let xml = r#"<member><param name="s" in="body" cref="T:Contoso.SampleObject">Sample</param></member>"#;

        run(&ParamToRequestBodyFilter, &mut operation, xml, &mut registry).unwrap();
        run(
            &ParamToRequestBodyFilter,
            &mut operation,
            r#"<member><param name="t" in="body" cref="T:System.String">Other</param></member>"#,
            &mut registry,
        )
        .unwrap();

        let body = operation.request_body.unwrap();
        assert_eq!(body.description.as_deref(), Some("Sample"));
        assert_eq!(
            body.content["application/json"].schema,
            Some(Schema::reference_to("Contoso.SampleObject"))
        );
    }
}
