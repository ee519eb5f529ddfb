//! Classification of resolved types into the shapes the schema registry understands.

use crate::openapi::Schema;
use crate::type_resolver::{
    TypeDescriptor, TypeName, DICTIONARY, IDICTIONARY, IENUMERABLE, IENUMERABLE_GENERIC,
    IREADONLY_DICTIONARY, SYSTEM_NULLABLE, SYSTEM_OBJECT, SYSTEM_STRING,
};

/// Schema-relevant category of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Simple,
    Enum,
    Dictionary,
    Enumerable,
    Object,
}

const DICTIONARY_DEFINITIONS: [&str; 3] = [IDICTIONARY, DICTIONARY, IREADONLY_DICTIONARY];

/// Classify a type. The checks run in a fixed order: simple, enum, dictionary, enumerable.
pub fn classify(descriptor: &TypeDescriptor) -> TypeCategory {
    if simple_type_schema(&descriptor.name).is_some() {
        TypeCategory::Simple
    } else if descriptor.is_enum() {
        TypeCategory::Enum
    } else if dictionary_value_type(descriptor).is_some() {
        TypeCategory::Dictionary
    } else if is_enumerable(descriptor) {
        TypeCategory::Enumerable
    } else {
        TypeCategory::Object
    }
}

/// Schema for a primitive-like type, `None` when the type is not in the simple table.
/// `System.Nullable`1[T]` maps like `T`.
pub fn simple_type_schema(name: &TypeName) -> Option<Schema> {
    if name.is_array() {
        return None;
    }
    if name.definition == SYSTEM_NULLABLE {
        return name.arguments.first().and_then(simple_type_schema);
    }
    if !name.arguments.is_empty() {
        return None;
    }

    let schema = match name.definition.as_str() {
        "System.Boolean" => Schema::of_type("boolean", None),
        "System.Byte" => Schema::of_type("string", Some("byte")),
        "System.SByte" | "System.Int16" | "System.UInt16" | "System.Int32" | "System.UInt32" => {
            Schema::of_type("integer", Some("int32"))
        }
        "System.Int64" | "System.UInt64" => Schema::of_type("integer", Some("int64")),
        "System.Single" => Schema::of_type("number", Some("float")),
        "System.Double" | "System.Decimal" => Schema::of_type("number", Some("double")),
        "System.DateTime" | "System.DateTimeOffset" => {
            Schema::of_type("string", Some("date-time"))
        }
        "System.Guid" => Schema {
            min_length: Some(36),
            max_length: Some(36),
            example: Some(serde_json::Value::String(
                "00000000-0000-0000-0000-000000000000".to_string(),
            )),
            ..Schema::of_type("string", Some("uuid"))
        },
        "System.Char" => Schema {
            min_length: Some(1),
            max_length: Some(1),
            example: Some(serde_json::Value::String("a".to_string())),
            ..Schema::of_type("string", None)
        },
        SYSTEM_STRING => Schema::of_type("string", None),
        SYSTEM_OBJECT => Schema::of_type("object", None),
        _ => return None,
    };
    Some(schema)
}

/// Value type of a dictionary (the key is always a string in OpenAPI)
pub fn dictionary_value_type(descriptor: &TypeDescriptor) -> Option<&TypeName> {
    if descriptor.is_array() {
        return None;
    }
    descriptor
        .find_generic_of(&DICTIONARY_DEFINITIONS)
        .and_then(|dictionary| dictionary.arguments.get(1))
}

fn is_enumerable(descriptor: &TypeDescriptor) -> bool {
    if descriptor.name.definition == SYSTEM_STRING {
        return false;
    }
    descriptor.is_array()
        || descriptor.implements(IENUMERABLE_GENERIC)
        || descriptor.implements(IENUMERABLE)
}

/// Item type of an enumerable; untyped enumerables yield `System.Object`
pub fn enumerable_item_type(descriptor: &TypeDescriptor) -> TypeName {
    if let Some(element) = descriptor.name.element_type() {
        return element;
    }
    descriptor
        .find_generic_of(&[IENUMERABLE_GENERIC])
        .and_then(|enumerable| enumerable.arguments.first())
        .cloned()
        .unwrap_or_else(|| TypeName::simple(SYSTEM_OBJECT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_resolver::{TypeCatalog, TypeDefinition, TypeKind, TypeResolver};
    use rstest::rstest;

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.add_definition(TypeDefinition {
            name: "Contoso.Status".to_string(),
            kind: TypeKind::Enum,
            enum_values: vec!["On".to_string(), "Off".to_string()],
            ..TypeDefinition::default()
        });
        catalog.add_definition(TypeDefinition {
            name: "Contoso.Widget".to_string(),
            ..TypeDefinition::default()
        });
        catalog.add_definition(TypeDefinition {
            name: "Contoso.WidgetLookup".to_string(),
            interfaces: vec![
                "System.Collections.Generic.IDictionary`2[System.String,Contoso.Widget]"
                    .to_string(),
            ],
            ..TypeDefinition::default()
        });
        catalog
    }

    #[rstest]
    #[case("System.String", TypeCategory::Simple)]
    #[case("System.Int32", TypeCategory::Simple)]
    #[case("System.Nullable`1[System.Guid]", TypeCategory::Simple)]
    #[case("Contoso.Status", TypeCategory::Enum)]
    #[case(
        "System.Collections.Generic.Dictionary`2[System.String,Contoso.Widget]",
        TypeCategory::Dictionary
    )]
    #[case("Contoso.WidgetLookup", TypeCategory::Dictionary)]
    #[case("System.Collections.Generic.List`1[Contoso.Widget]", TypeCategory::Enumerable)]
    #[case("Contoso.Widget[]", TypeCategory::Enumerable)]
    #[case("System.String[]", TypeCategory::Enumerable)]
    #[case("Contoso.Widget", TypeCategory::Object)]
    #[case("System.Object", TypeCategory::Simple)]
    fn test_classify(#[case] name: &str, #[case] expected: TypeCategory) {
        let descriptor = catalog().load_type(name).unwrap();
        assert_eq!(classify(&descriptor), expected);
    }

    #[test]
    fn test_string_is_not_enumerable() {
        let string = catalog().load_type(SYSTEM_STRING).unwrap();
        assert!(string.implements(IENUMERABLE_GENERIC));
        assert!(!is_enumerable(&string));
    }

    #[test]
    fn test_simple_type_formats() {
        let decimal = simple_type_schema(&TypeName::simple("System.Decimal")).unwrap();
        assert_eq!(decimal.schema_type.as_deref(), Some("number"));
        assert_eq!(decimal.format.as_deref(), Some("double"));

        let guid = simple_type_schema(&TypeName::simple("System.Guid")).unwrap();
        assert_eq!(guid.format.as_deref(), Some("uuid"));
        assert_eq!((guid.min_length, guid.max_length), (Some(36), Some(36)));

        let character = simple_type_schema(&TypeName::simple("System.Char")).unwrap();
        assert_eq!((character.min_length, character.max_length), (Some(1), Some(1)));
        assert!(character.example.is_some());
    }

    #[test]
    fn test_item_and_value_types() {
        let catalog = catalog();
        let lookup = catalog.load_type("Contoso.WidgetLookup").unwrap();
        assert_eq!(dictionary_value_type(&lookup).unwrap().to_string(), "Contoso.Widget");

        let list = catalog
            .load_type("System.Collections.Generic.List`1[Contoso.Widget]")
            .unwrap();
        assert_eq!(enumerable_item_type(&list).to_string(), "Contoso.Widget");

        let untyped = catalog.load_type("System.Collections.IEnumerable").unwrap();
        assert_eq!(enumerable_item_type(&untyped).to_string(), SYSTEM_OBJECT);
    }
}
