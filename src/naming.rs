//! Name sanitization for schema references and property name resolution.

use crate::type_resolver::PropertyDescriptor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static GENERIC_ARITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`\d+").unwrap());

static ILLEGAL_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.\-_]").unwrap());

/// Converts a reflected type name into an OpenAPI component name.
///
/// The steps run in a fixed order: nested-type separators become `.`, generic arity markers
/// (`` `1 ``) are dropped, generic argument separators become `-`, and anything else outside
/// `[a-zA-Z0-9.\-_]` becomes `_`.
///
/// ```
/// use xmldoc_openapi::naming::sanitize;
///
/// assert_eq!(
///     sanitize("System.Collections.Generic.Dictionary`2[System.String,Ns.Outer+User]"),
///     "System.Collections.Generic.Dictionary_System.String-Ns.Outer.User_"
/// );
/// ```
pub fn sanitize(full_name: &str) -> String {
    let nested = full_name.replace('+', ".");
    let without_arity = GENERIC_ARITY.replace_all(&nested, "");
    let separated = without_arity.replace(',', "-");
    ILLEGAL_CHARACTERS.replace_all(&separated, "_").into_owned()
}

/// How property names are written into object schemas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyNaming {
    /// Serialized-name override when present, otherwise the declared name
    #[default]
    Default,
    /// Like `Default`, but declared names are camel-cased
    CamelCase,
}

impl PropertyNaming {
    /// Resolve the schema property name for a declared property
    pub fn resolve(&self, property: &PropertyDescriptor) -> String {
        if let Some(serialized) = &property.metadata.serialized_name {
            return serialized.clone();
        }
        match self {
            PropertyNaming::Default => property.name.clone(),
            PropertyNaming::CamelCase => to_camel_case(&property.name),
        }
    }
}

fn to_camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_resolver::{PropertyMetadata, TypeName};
    use rstest::rstest;

    static VALID_NAME: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9.\-_]+$").unwrap());

    #[rstest]
    #[case("System.String", "System.String")]
    #[case("Contoso.Outer+Inner", "Contoso.Outer.Inner")]
    #[case("Contoso.Page`1[Contoso.User]", "Contoso.Page_Contoso.User_")]
    #[case(
        "System.Collections.Generic.Dictionary`2[System.String,Contoso.User]",
        "System.Collections.Generic.Dictionary_System.String-Contoso.User_"
    )]
    #[case(
        "Contoso.Page`1[[Contoso.User, Contoso.Contracts, Version=1.0.0.0]]",
        "Contoso.Page__Contoso.User-_Contoso.Contracts-_Version_1.0.0.0__"
    )]
    #[case("Contoso.User[]", "Contoso.User__")]
    fn test_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[rstest]
    #[case("Contoso.Page`1[Contoso.Outer+Nested`2[System.Int32,System.String]]")]
    #[case("Weird Name<With>{Braces}`10")]
    #[case("a,b,,c+d`3[x]")]
    fn test_sanitize_output_is_valid_and_idempotent(#[case] input: &str) {
        let once = sanitize(input);
        assert!(VALID_NAME.is_match(&once), "{} is not a valid name", once);
        assert_eq!(sanitize(&once), once);
    }

    fn property(name: &str, serialized: Option<&str>) -> PropertyDescriptor {
        PropertyDescriptor {
            name: name.to_string(),
            property_type: TypeName::simple("System.String"),
            metadata: PropertyMetadata {
                serialized_name: serialized.map(str::to_string),
                ..PropertyMetadata::default()
            },
        }
    }

    #[test]
    fn test_property_naming_prefers_serialized_name() {
        let renamed = property("DisplayName", Some("display_name"));
        assert_eq!(PropertyNaming::Default.resolve(&renamed), "display_name");
        assert_eq!(PropertyNaming::CamelCase.resolve(&renamed), "display_name");
    }

    #[test]
    fn test_property_naming_camel_case() {
        let plain = property("DisplayName", None);
        assert_eq!(PropertyNaming::Default.resolve(&plain), "DisplayName");
        assert_eq!(PropertyNaming::CamelCase.resolve(&plain), "displayName");
    }
}
