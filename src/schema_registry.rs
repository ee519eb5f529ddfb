//! Schema reference registry: converts resolved types into OpenAPI schemas.
//!
//! Object types are interned under their sanitized name and referenced with `$ref`; simple,
//! enum, dictionary and enumerable types are returned inline on every call.

use crate::classifier::{
    classify, dictionary_value_type, enumerable_item_type, simple_type_schema, TypeCategory,
};
use crate::naming::{sanitize, PropertyNaming};
use crate::openapi::Schema;
use crate::type_resolver::{TypeDescriptor, TypeName, TypeResolver};
use indexmap::IndexMap;
use log::debug;

/// Memoizing store of component schemas for one document variant
pub struct SchemaReferenceRegistry<'r> {
    resolver: &'r dyn TypeResolver,
    naming: PropertyNaming,
    /// Sanitized type name -> schema; `None` while the type is being expanded
    references: IndexMap<String, Option<Schema>>,
}

impl<'r> SchemaReferenceRegistry<'r> {
    pub fn new(resolver: &'r dyn TypeResolver, naming: PropertyNaming) -> Self {
        Self {
            resolver,
            naming,
            references: IndexMap::new(),
        }
    }

    /// The resolver this registry loads property types with
    pub fn resolver(&self) -> &'r dyn TypeResolver {
        self.resolver
    }

    /// Returns the schema for `descriptor`, registering object types on first sight.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - The resolved type, or `None` for an unknown or unbound generic type
    ///
    /// # Returns
    ///
    /// An empty schema for `None`, a `$ref` for object types (and for any name already present
    /// in the registry, even while its body is still being built), or an inline schema for
    /// everything else.
    pub fn find_or_add_reference(&mut self, descriptor: Option<&TypeDescriptor>) -> Schema {
        let Some(descriptor) = descriptor else {
            return Schema::default();
        };

        let key = sanitize(&descriptor.full_name());
        if self.references.contains_key(&key) {
            return Schema::reference_to(&key);
        }

        match classify(descriptor) {
            TypeCategory::Simple => simple_type_schema(&descriptor.name).unwrap_or_default(),
            TypeCategory::Enum => Schema {
                enum_values: descriptor.enum_values.clone(),
                ..Schema::of_type("string", None)
            },
            TypeCategory::Dictionary => {
                let value_type = dictionary_value_type(descriptor).cloned();
                let value_schema = match value_type {
                    Some(value_type) => self.find_or_add_type(&value_type),
                    None => Schema::default(),
                };
                Schema {
                    additional_properties: Some(Box::new(value_schema)),
                    ..Schema::of_type("object", None)
                }
            }
            TypeCategory::Enumerable => {
                let item_type = enumerable_item_type(descriptor);
                Schema {
                    items: Some(Box::new(self.find_or_add_type(&item_type))),
                    ..Schema::of_type("array", None)
                }
            }
            TypeCategory::Object => self.add_object(key, descriptor),
        }
    }

    /// Resolve `name` and look it up, see [`find_or_add_reference`](Self::find_or_add_reference)
    pub fn find_or_add_type(&mut self, name: &TypeName) -> Schema {
        let descriptor = self.resolver.resolve(name);
        if descriptor.is_none() {
            debug!("Type {} is unknown or nameless, using an empty schema", name);
        }
        self.find_or_add_reference(descriptor.as_ref())
    }

    fn add_object(&mut self, key: String, descriptor: &TypeDescriptor) -> Schema {
        debug!("Registering object schema {}", key);
        // Placeholder first: properties referring back to this type resolve to a $ref
        self.references.insert(key.clone(), None);

        let mut schema = Schema::of_type("object", None);
        for property in &descriptor.properties {
            if property.metadata.is_ignored {
                continue;
            }
            let name = self.naming.resolve(property);
            if schema.properties.contains_key(&name) {
                debug!("Duplicate property {} on {}, keeping the first", name, key);
                continue;
            }

            let mut property_schema = self.find_or_add_type(&property.property_type);
            if property.metadata.is_read_only {
                property_schema.read_only = Some(true);
            }
            if property.metadata.is_required {
                schema.required.insert(name.clone());
            }
            schema.properties.insert(name, property_schema);
        }

        self.references.insert(key.clone(), Some(schema));
        Schema::reference_to(&key)
    }

    /// True when `key` is registered, finished or not
    pub fn contains(&self, key: &str) -> bool {
        self.references.contains_key(key)
    }

    /// Finished schema registered under `key`
    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.references.get(key).and_then(Option::as_ref)
    }

    /// Finished schemas in registration order
    pub fn references(&self) -> IndexMap<String, Schema> {
        self.references
            .iter()
            .filter_map(|(key, schema)| schema.clone().map(|schema| (key.clone(), schema)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
