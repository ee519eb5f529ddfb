//! Type metadata used in place of runtime reflection.
//!
//! Type sources (YAML/JSON manifests and Rust contract files) are loaded into a [`TypeCatalog`]
//! of open [`TypeDefinition`]s. The schema registry and the filters only ever see closed
//! [`TypeDescriptor`]s obtained through the [`TypeResolver`] trait, so they never depend on where
//! the metadata came from.
//!
//! Type names follow the reflected `ToString()` grammar:
//!
//! - `System.String`
//! - `Contoso.Outer+Inner` (nested type)
//! - ``Contoso.Page`1[Contoso.User]`` (closed generic)
//! - ``System.Collections.Generic.Dictionary`2[System.String,Contoso.User]``
//! - `Contoso.User[]` (array)
//! - ``Contoso.Page`1[[Contoso.User, Contoso.Contracts]]`` (assembly-qualified argument)

use crate::error::{Error, TypeLoadError};
use crate::xml::strip_member_prefix;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

pub const SYSTEM_STRING: &str = "System.String";
pub const SYSTEM_OBJECT: &str = "System.Object";
pub const SYSTEM_NULLABLE: &str = "System.Nullable`1";
pub const IENUMERABLE: &str = "System.Collections.IEnumerable";
pub const IENUMERABLE_GENERIC: &str = "System.Collections.Generic.IEnumerable`1";
pub const LIST: &str = "System.Collections.Generic.List`1";
pub const DICTIONARY: &str = "System.Collections.Generic.Dictionary`2";
pub const IDICTIONARY: &str = "System.Collections.Generic.IDictionary`2";
pub const IREADONLY_DICTIONARY: &str = "System.Collections.Generic.IReadOnlyDictionary`2";

/// A parsed, possibly generic or array, type name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    /// Definition name including the arity marker (e.g. ``Contoso.Page`1``)
    pub definition: String,
    /// Generic arguments, empty for non-generic or open generic names
    pub arguments: Vec<TypeName>,
    /// Number of trailing `[]`
    pub array_rank: usize,
}

impl TypeName {
    pub fn simple(definition: &str) -> Self {
        Self {
            definition: definition.to_string(),
            arguments: Vec::new(),
            array_rank: 0,
        }
    }

    pub fn generic(definition: &str, arguments: Vec<TypeName>) -> Self {
        Self {
            definition: definition.to_string(),
            arguments,
            array_rank: 0,
        }
    }

    pub fn array_of(element: TypeName) -> Self {
        Self {
            array_rank: element.array_rank + 1,
            ..element
        }
    }

    /// Parse a type name, ignoring a trailing assembly qualifier
    pub fn parse(input: &str) -> Result<Self, TypeLoadError> {
        let mut parser = NameParser::new(input);
        let name = parser.parse_type()?;
        parser.skip_whitespace();
        match parser.peek() {
            None | Some(',') => Ok(name),
            Some(other) => Err(parser.error(&format!("unexpected character '{}'", other))),
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    /// Element type of an array name
    pub fn element_type(&self) -> Option<TypeName> {
        if !self.is_array() {
            return None;
        }
        Some(TypeName {
            array_rank: self.array_rank - 1,
            ..self.clone()
        })
    }

    /// Arity encoded in the definition name (``Page`2`` → 2)
    pub fn declared_arity(&self) -> usize {
        declared_arity(&self.definition)
    }

    /// Replace generic parameter names using `bindings`
    pub fn substitute(&self, bindings: &HashMap<String, TypeName>) -> TypeName {
        if self.arguments.is_empty() {
            if let Some(bound) = bindings.get(&self.definition) {
                return TypeName {
                    array_rank: bound.array_rank + self.array_rank,
                    ..bound.clone()
                };
            }
        }
        TypeName {
            definition: self.definition.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|argument| argument.substitute(bindings))
                .collect(),
            array_rank: self.array_rank,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition)?;
        if !self.arguments.is_empty() {
            write!(f, "[")?;
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", argument)?;
            }
            write!(f, "]")?;
        }
        for _ in 0..self.array_rank {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

fn declared_arity(definition: &str) -> usize {
    definition
        .rsplit_once('`')
        .and_then(|(_, arity)| arity.parse().ok())
        .unwrap_or(0)
}

fn strip_arity(definition: &str) -> &str {
    match definition.rsplit_once('`') {
        Some((base, arity)) if arity.chars().all(|c| c.is_ascii_digit()) => base,
        _ => definition,
    }
}

struct NameParser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> NameParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> TypeLoadError {
        TypeLoadError::InvalidTypeName {
            name: self.input.to_string(),
            message: format!("{} at position {}", message, self.pos),
        }
    }

    fn parse_type(&mut self) -> Result<TypeName, TypeLoadError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '[' | ']' | ',') {
                break;
            }
            self.pos += 1;
        }
        let definition: String = self.chars[start..self.pos].iter().collect();
        let definition = definition.trim().to_string();
        if definition.is_empty() {
            return Err(self.error("expected a type name"));
        }

        let mut name = TypeName::simple(&definition);
        while self.peek() == Some('[') {
            if self.peek_at(1) == Some(']') {
                self.pos += 2;
                name.array_rank += 1;
                continue;
            }
            if name.array_rank > 0 || !name.arguments.is_empty() {
                return Err(self.error("unexpected generic argument list"));
            }
            self.pos += 1;
            name.arguments = self.parse_arguments()?;
        }
        Ok(name)
    }

    fn parse_arguments(&mut self) -> Result<Vec<TypeName>, TypeLoadError> {
        let mut arguments = Vec::new();
        loop {
            self.skip_whitespace();
            let argument = if self.peek() == Some('[') {
                self.pos += 1;
                let qualified = self.parse_type()?;
                // Assembly qualifiers never contain brackets
                while let Some(c) = self.peek() {
                    if c == ']' {
                        break;
                    }
                    self.pos += 1;
                }
                if self.peek() != Some(']') {
                    return Err(self.error("unterminated assembly-qualified argument"));
                }
                self.pos += 1;
                qualified
            } else {
                self.parse_type()?
            };
            arguments.push(argument);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {
                    self.pos += 1;
                    return Ok(arguments);
                }
                _ => return Err(self.error("unterminated generic argument list")),
            }
        }
    }
}

/// Kind of a declared type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    #[default]
    Class,
    Enum,
}

/// Open type definition as declared by a type source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinition {
    /// Full name; generic definitions carry their arity (``Contoso.Page`1``)
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    #[serde(default)]
    pub enum_values: Vec<String>,
    /// Implemented interfaces, written with the generic parameters of this definition
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

/// Declared property of a [`TypeDefinition`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Serialization-name override
    #[serde(default)]
    pub json_name: Option<String>,
    /// Always-required marker
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub has_setter: bool,
    #[serde(default)]
    pub ignored: bool,
}

fn default_true() -> bool {
    true
}

impl PropertyDefinition {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            json_name: None,
            required: false,
            has_setter: true,
            ignored: false,
        }
    }
}

/// Contents of a YAML or JSON type manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeManifest {
    #[serde(default)]
    pub assembly: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

/// Per-property serialization metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMetadata {
    pub serialized_name: Option<String>,
    pub is_required: bool,
    pub is_read_only: bool,
    pub is_ignored: bool,
}

/// Property of a closed type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Declared name
    pub name: String,
    pub property_type: TypeName,
    pub metadata: PropertyMetadata,
}

/// A closed (or open generic definition) type, as the registry sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: TypeName,
    pub kind: TypeKind,
    /// Generic parameter names of the definition
    pub generic_parameters: Vec<String>,
    pub enum_values: Vec<String>,
    pub properties: Vec<PropertyDescriptor>,
    pub interfaces: Vec<TypeName>,
}

impl TypeDescriptor {
    pub fn full_name(&self) -> String {
        self.name.to_string()
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_array(&self) -> bool {
        self.name.is_array()
    }

    /// True for an open generic definition such as ``Contoso.Page`1``
    pub fn is_generic_definition(&self) -> bool {
        !self.generic_parameters.is_empty() && self.name.arguments.is_empty()
    }

    /// The instantiation of one of `definitions` that this type is or implements
    pub fn find_generic_of(&self, definitions: &[&str]) -> Option<&TypeName> {
        if !self.is_array() && definitions.contains(&self.name.definition.as_str()) {
            return Some(&self.name);
        }
        self.interfaces
            .iter()
            .find(|interface| definitions.contains(&interface.definition.as_str()))
    }

    pub fn implements(&self, definition: &str) -> bool {
        self.find_generic_of(&[definition]).is_some()
    }
}

/// Type introspection capability used by the registry and the filters
pub trait TypeResolver {
    /// Resolve a parsed name into a descriptor; `None` for unknown or unbound generic parameters
    fn resolve(&self, name: &TypeName) -> Option<TypeDescriptor>;

    fn load_type(&self, name: &str) -> Option<TypeDescriptor> {
        match TypeName::parse(strip_member_prefix(name)) {
            Ok(parsed) => self.resolve(&parsed),
            Err(e) => {
                debug!("Cannot load type {}: {}", name, e);
                None
            }
        }
    }

    /// Builds a type from the ordered `cref` tokens of a documentation tag.
    ///
    /// A generic definition of arity N consumes the next N tokens as its arguments, recursively,
    /// so `[Page`1, Pair`2, String, Int32]` yields ``Page`1[Pair`2[String,Int32]]``.
    fn load_type_from_reference_tokens(
        &self,
        tokens: &[String],
    ) -> Result<TypeDescriptor, TypeLoadError> {
        if tokens.is_empty() {
            return Err(TypeLoadError::InvalidTypeName {
                name: String::new(),
                message: "no type reference was documented".to_string(),
            });
        }
        let mut position = 0;
        let name = build_from_tokens(self, tokens, &mut position)?;
        if position < tokens.len() {
            return Err(TypeLoadError::IncorrectlyOrderedGenericType {
                tokens: tokens.join(", "),
            });
        }
        self.resolve(&name)
            .ok_or_else(|| TypeLoadError::UnknownType(name.to_string()))
    }
}

fn build_from_tokens<R: TypeResolver + ?Sized>(
    resolver: &R,
    tokens: &[String],
    position: &mut usize,
) -> Result<TypeName, TypeLoadError> {
    let token = strip_member_prefix(&tokens[*position]);
    *position += 1;

    let parsed = TypeName::parse(token)?;
    if !parsed.arguments.is_empty() {
        return Ok(parsed);
    }
    let element = TypeName {
        array_rank: 0,
        ..parsed.clone()
    };
    let open = resolver
        .resolve(&element)
        .ok_or_else(|| TypeLoadError::UnknownType(token.to_string()))?;
    let arity = if open.is_generic_definition() {
        open.generic_parameters.len()
    } else {
        0
    };
    if arity == 0 {
        return Ok(TypeName {
            array_rank: parsed.array_rank,
            ..open.name
        });
    }

    let remaining = tokens.len() - *position;
    if remaining < arity {
        return Err(TypeLoadError::UndocumentedGenericType {
            type_name: open.name.definition,
            expected: arity,
            found: remaining,
        });
    }
    let mut arguments = Vec::with_capacity(arity);
    for _ in 0..arity {
        // A nested generic argument may already have consumed the remaining tokens
        if *position >= tokens.len() {
            return Err(TypeLoadError::UndocumentedGenericType {
                type_name: open.name.definition,
                expected: arity,
                found: arguments.len(),
            });
        }
        arguments.push(build_from_tokens(resolver, tokens, position)?);
    }
    Ok(TypeName {
        definition: open.name.definition,
        arguments,
        array_rank: parsed.array_rank,
    })
}

/// In-memory catalog of type definitions
#[derive(Debug)]
pub struct TypeCatalog {
    definitions: IndexMap<String, TypeDefinition>,
    /// Alternative spellings → canonical definition names
    aliases: HashMap<String, Vec<String>>,
}

impl TypeCatalog {
    /// Create a catalog containing the built-in system types
    pub fn new() -> Self {
        let mut catalog = Self {
            definitions: IndexMap::new(),
            aliases: HashMap::new(),
        };
        for definition in builtin_definitions() {
            catalog.insert(definition, false);
        }
        catalog
    }

    /// Number of definitions, built-ins included
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Register a user definition; a later definition with the same name replaces the earlier
    pub fn add_definition(&mut self, mut definition: TypeDefinition) {
        let arity = definition.generic_parameters.len();
        if arity > 0 && declared_arity(&definition.name) == 0 {
            definition.name = format!("{}`{}", definition.name, arity);
        }
        debug!("Registering type definition: {}", definition.name);
        self.insert(definition, true);
    }

    pub fn add_manifest(&mut self, manifest: TypeManifest) {
        debug!(
            "Adding {} types from manifest {}",
            manifest.types.len(),
            manifest.assembly.as_deref().unwrap_or("<unnamed>")
        );
        for definition in manifest.types {
            self.add_definition(definition);
        }
    }

    /// Loads a YAML or JSON manifest, chosen by file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] when the file cannot be read or deserialized.
    pub fn load_manifest(&mut self, path: &Path) -> Result<(), Error> {
        let manifest_error = |message: String| Error::Manifest {
            file: path.to_path_buf(),
            message,
        };
        let content = fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;
        let manifest: TypeManifest = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| manifest_error(e.to_string()))?
            }
            _ => serde_yaml::from_str(&content).map_err(|e| manifest_error(e.to_string()))?,
        };
        self.add_manifest(manifest);
        Ok(())
    }

    fn insert(&mut self, definition: TypeDefinition, with_simple_names: bool) {
        let canonical = definition.name.clone();
        let nested = canonical.replace('+', ".");
        let mut spellings = vec![nested.clone(), strip_arity(&nested).to_string()];
        if with_simple_names {
            let simple = nested.rsplit('.').next().unwrap_or(&nested).to_string();
            spellings.push(strip_arity(&simple).to_string());
            spellings.push(simple);
        }
        for spelling in spellings {
            let entry = self.aliases.entry(spelling).or_default();
            if !entry.contains(&canonical) {
                entry.push(canonical.clone());
            }
        }
        self.definitions.insert(canonical, definition);
    }

    fn find_definition(&self, name: &str) -> Option<&TypeDefinition> {
        if let Some(definition) = self.definitions.get(name) {
            return Some(definition);
        }
        let candidates = self.aliases.get(&name.replace('+', "."))?;
        match candidates.as_slice() {
            [single] => self.definitions.get(single),
            _ => {
                warn!("Type name {} is ambiguous: {:?}", name, candidates);
                None
            }
        }
    }

    /// Canonical spelling of `name`, or `name` itself when it cannot be resolved
    fn canonical(&self, name: &TypeName) -> TypeName {
        match self.find_definition(&name.definition) {
            Some(definition) => TypeName {
                definition: definition.name.clone(),
                arguments: name.arguments.iter().map(|a| self.canonical(a)).collect(),
                array_rank: name.array_rank,
            },
            None => name.clone(),
        }
    }

    fn parse_member_type(owner: &str, expression: &str) -> TypeName {
        TypeName::parse(expression).unwrap_or_else(|e| {
            warn!("Member of {} has an unreadable type: {}", owner, e);
            TypeName::simple(SYSTEM_OBJECT)
        })
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeResolver for TypeCatalog {
    fn resolve(&self, name: &TypeName) -> Option<TypeDescriptor> {
        if let Some(element) = name.element_type() {
            let element = self.canonical(&element);
            return Some(TypeDescriptor {
                name: TypeName::array_of(element.clone()),
                kind: TypeKind::Class,
                generic_parameters: Vec::new(),
                enum_values: Vec::new(),
                properties: Vec::new(),
                interfaces: vec![TypeName::generic(IENUMERABLE_GENERIC, vec![element])],
            });
        }

        let definition = self.find_definition(&name.definition)?;
        if !name.arguments.is_empty() && name.arguments.len() != definition.generic_parameters.len()
        {
            warn!(
                "Type {} expects {} generic argument(s), got {}",
                definition.name,
                definition.generic_parameters.len(),
                name.arguments.len()
            );
            return None;
        }

        let arguments: Vec<TypeName> = name.arguments.iter().map(|a| self.canonical(a)).collect();
        let bindings: HashMap<String, TypeName> = definition
            .generic_parameters
            .iter()
            .cloned()
            .zip(arguments.iter().cloned())
            .collect();

        let properties = definition
            .properties
            .iter()
            .map(|property| PropertyDescriptor {
                name: property.name.clone(),
                property_type: Self::parse_member_type(&definition.name, &property.type_name)
                    .substitute(&bindings),
                metadata: PropertyMetadata {
                    serialized_name: property.json_name.clone(),
                    is_required: property.required,
                    is_read_only: !property.has_setter,
                    is_ignored: property.ignored,
                },
            })
            .collect();
        let interfaces = definition
            .interfaces
            .iter()
            .map(|interface| {
                let interface = Self::parse_member_type(&definition.name, interface);
                self.canonical(&interface.substitute(&bindings))
            })
            .collect();

        Some(TypeDescriptor {
            name: TypeName::generic(&definition.name, arguments),
            kind: definition.kind,
            generic_parameters: definition.generic_parameters.clone(),
            enum_values: definition.enum_values.clone(),
            properties,
            interfaces,
        })
    }
}

fn builtin_definitions() -> Vec<TypeDefinition> {
    let plain = |name: &str| TypeDefinition {
        name: name.to_string(),
        ..TypeDefinition::default()
    };
    let generic = |name: &str, parameters: &[&str], interfaces: &[&str]| TypeDefinition {
        name: name.to_string(),
        generic_parameters: parameters.iter().map(|p| p.to_string()).collect(),
        interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
        ..TypeDefinition::default()
    };

    let mut definitions: Vec<TypeDefinition> = [
        "System.Boolean",
        "System.Byte",
        "System.SByte",
        "System.Int16",
        "System.UInt16",
        "System.Int32",
        "System.UInt32",
        "System.Int64",
        "System.UInt64",
        "System.Single",
        "System.Double",
        "System.Decimal",
        "System.DateTime",
        "System.DateTimeOffset",
        "System.Guid",
        "System.Char",
        SYSTEM_OBJECT,
        IENUMERABLE,
    ]
    .into_iter()
    .map(plain)
    .collect();

    definitions.push(TypeDefinition {
        interfaces: vec![format!("{}[System.Char]", IENUMERABLE_GENERIC)],
        ..plain(SYSTEM_STRING)
    });
    definitions.push(generic(SYSTEM_NULLABLE, &["T"], &[]));
    definitions.push(generic(IENUMERABLE_GENERIC, &["T"], &[IENUMERABLE]));

    let enumerable_of_t = format!("{}[T]", IENUMERABLE_GENERIC);
    for collection in [
        "System.Collections.Generic.ICollection`1",
        "System.Collections.Generic.IList`1",
        "System.Collections.Generic.IReadOnlyCollection`1",
        "System.Collections.Generic.IReadOnlyList`1",
        "System.Collections.Generic.HashSet`1",
        LIST,
    ] {
        definitions.push(generic(collection, &["T"], &[enumerable_of_t.as_str(), IENUMERABLE]));
    }

    let pair = "System.Collections.Generic.KeyValuePair`2";
    let mut key_value = generic(pair, &["TKey", "TValue"], &[]);
    key_value.properties = vec![
        PropertyDefinition::new("Key", "TKey"),
        PropertyDefinition::new("Value", "TValue"),
    ];
    definitions.push(key_value);

    let enumerable_of_pairs = format!("{}[{}[TKey,TValue]]", IENUMERABLE_GENERIC, pair);
    let idictionary = format!("{}[TKey,TValue]", IDICTIONARY);
    definitions.push(generic(
        IDICTIONARY,
        &["TKey", "TValue"],
        &[enumerable_of_pairs.as_str(), IENUMERABLE],
    ));
    definitions.push(generic(
        IREADONLY_DICTIONARY,
        &["TKey", "TValue"],
        &[enumerable_of_pairs.as_str(), IENUMERABLE],
    ));
    definitions.push(generic(
        DICTIONARY,
        &["TKey", "TValue"],
        &[idictionary.as_str(), enumerable_of_pairs.as_str(), IENUMERABLE],
    ));
    definitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn catalog_with_samples() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.add_definition(TypeDefinition {
            name: "Contoso.User".to_string(),
            properties: vec![PropertyDefinition::new("Name", SYSTEM_STRING)],
            ..TypeDefinition::default()
        });
        catalog.add_definition(TypeDefinition {
            name: "Contoso.Page".to_string(),
            generic_parameters: vec!["T".to_string()],
            properties: vec![
                PropertyDefinition::new("Items", "System.Collections.Generic.List`1[T]"),
                PropertyDefinition::new("First", "T"),
            ],
            ..TypeDefinition::default()
        });
        catalog.add_definition(TypeDefinition {
            name: "Contoso.Pair`2".to_string(),
            generic_parameters: vec!["TLeft".to_string(), "TRight".to_string()],
            ..TypeDefinition::default()
        });
        catalog.add_definition(TypeDefinition {
            name: "Contoso.Outer+Inner".to_string(),
            ..TypeDefinition::default()
        });
        catalog
    }

    #[test]
    fn test_parse_simple_and_nested_names() {
        let name = TypeName::parse("Contoso.Outer+Inner").unwrap();
        assert_eq!(name, TypeName::simple("Contoso.Outer+Inner"));
        assert_eq!(name.to_string(), "Contoso.Outer+Inner");
    }

    #[test]
    fn test_parse_generic_and_array_names() {
        let name = TypeName::parse(
            "System.Collections.Generic.Dictionary`2[System.String,Contoso.Page`1[Contoso.User[]]]",
        )
        .unwrap();

        assert_eq!(name.definition, DICTIONARY);
        assert_eq!(name.arguments.len(), 2);
        assert_eq!(
            name.arguments[1].arguments[0],
            TypeName::array_of(TypeName::simple("Contoso.User"))
        );
        assert_eq!(
            name.to_string(),
            "System.Collections.Generic.Dictionary`2[System.String,Contoso.Page`1[Contoso.User[]]]"
        );
        assert_eq!(name.declared_arity(), 2);
    }

    #[test]
    fn test_parse_assembly_qualified_arguments() {
        let name = TypeName::parse(
            "Contoso.Page`1[[Contoso.User, Contoso.Contracts, Version=1.0.0.0]], Contoso.Contracts",
        )
        .unwrap();
        assert_eq!(name.to_string(), "Contoso.Page`1[Contoso.User]");
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        assert!(TypeName::parse("").is_err());
        assert!(TypeName::parse("Contoso.Page`1[Contoso.User").is_err());
        assert!(TypeName::parse("Contoso.Page`1[Contoso.User]]").is_err());
    }

    #[test]
    fn test_resolve_substitutes_generic_arguments() {
        let catalog = catalog_with_samples();
        let page = catalog.load_type("Contoso.Page`1[Contoso.User]").unwrap();

        assert_eq!(page.full_name(), "Contoso.Page`1[Contoso.User]");
        assert!(!page.is_generic_definition());
        assert_eq!(
            page.properties[0].property_type.to_string(),
            "System.Collections.Generic.List`1[Contoso.User]"
        );
        assert_eq!(page.properties[1].property_type.to_string(), "Contoso.User");
    }

    #[test]
    fn test_resolve_canonicalizes_short_names() {
        let catalog = catalog_with_samples();

        let page = catalog.load_type("Page`1[User]").unwrap();
        assert_eq!(page.full_name(), "Contoso.Page`1[Contoso.User]");

        let nested = catalog.load_type("Contoso.Outer.Inner").unwrap();
        assert_eq!(nested.full_name(), "Contoso.Outer+Inner");
    }

    #[test]
    fn test_resolve_unknown_and_generic_parameter() {
        let catalog = catalog_with_samples();
        assert!(catalog.load_type("Contoso.Missing").is_none());
        assert!(catalog.load_type("T").is_none());
    }

    #[test]
    fn test_resolve_array_implements_enumerable() {
        let catalog = catalog_with_samples();
        let array = catalog.load_type("User[]").unwrap();

        assert!(array.is_array());
        assert_eq!(array.full_name(), "Contoso.User[]");
        assert!(array.implements(IENUMERABLE_GENERIC));
    }

    #[test]
    fn test_dictionary_interfaces_are_closed() {
        let catalog = TypeCatalog::new();
        let dictionary = catalog
            .load_type("System.Collections.Generic.Dictionary`2[System.String,System.Int32]")
            .unwrap();
        let idictionary = dictionary.find_generic_of(&[IDICTIONARY]).unwrap();
        assert_eq!(
            idictionary.to_string(),
            "System.Collections.Generic.IDictionary`2[System.String,System.Int32]"
        );
    }

    #[test]
    fn test_reference_tokens_build_nested_generics() {
        let catalog = catalog_with_samples();
        let loaded = catalog
            .load_type_from_reference_tokens(&tokens(&[
                "T:Contoso.Page`1",
                "T:Contoso.Pair`2",
                "T:System.String",
                "T:Contoso.User",
            ]))
            .unwrap();

        assert_eq!(
            loaded.full_name(),
            "Contoso.Page`1[Contoso.Pair`2[System.String,Contoso.User]]"
        );
    }

    #[test]
    fn test_reference_tokens_accept_names_without_arity() {
        let catalog = catalog_with_samples();
        let loaded = catalog
            .load_type_from_reference_tokens(&tokens(&["T:Contoso.Page", "T:Contoso.User"]))
            .unwrap();
        assert_eq!(loaded.full_name(), "Contoso.Page`1[Contoso.User]");
    }

    #[test]
    fn test_reference_tokens_undocumented_generic_argument() {
        let catalog = catalog_with_samples();
        let error = catalog
            .load_type_from_reference_tokens(&tokens(&["T:Contoso.Pair`2", "T:System.String"]))
            .unwrap_err();

        assert_eq!(
            error,
            TypeLoadError::UndocumentedGenericType {
                type_name: "Contoso.Pair`2".to_string(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_reference_tokens_nested_generic_missing_argument() {
        let catalog = catalog_with_samples();
        let error = catalog
            .load_type_from_reference_tokens(&tokens(&[
                "T:Contoso.Pair`2",
                "T:Contoso.Pair`2",
                "T:System.String",
                "T:System.Int32",
            ]))
            .unwrap_err();

        assert_eq!(
            error,
            TypeLoadError::UndocumentedGenericType {
                type_name: "Contoso.Pair`2".to_string(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_reference_tokens_incorrect_order() {
        let catalog = catalog_with_samples();
        let error = catalog
            .load_type_from_reference_tokens(&tokens(&["T:Contoso.User", "T:Contoso.Page`1"]))
            .unwrap_err();
        assert!(matches!(error, TypeLoadError::IncorrectlyOrderedGenericType { .. }));
    }

    #[test]
    fn test_reference_tokens_unknown_type() {
        let catalog = catalog_with_samples();
        let error = catalog
            .load_type_from_reference_tokens(&tokens(&["T:Contoso.Nope"]))
            .unwrap_err();
        assert_eq!(error, TypeLoadError::UnknownType("Contoso.Nope".to_string()));
    }

    #[test]
    fn test_load_yaml_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contracts.yaml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(
            br#"
assembly: Contoso.Contracts
types:
  - name: Contoso.Status
    kind: enum
    enumValues: [Active, Retired]
  - name: Contoso.Account
    properties:
      - name: Id
        type: System.Guid
        jsonName: id
        required: true
      - name: Created
        type: System.DateTime
        hasSetter: false
"#,
        )
        .unwrap();

        let mut catalog = TypeCatalog::new();
        let builtins = catalog.len();
        catalog.load_manifest(&path).unwrap();
        assert_eq!(catalog.len(), builtins + 2);

        let status = catalog.load_type("Contoso.Status").unwrap();
        assert!(status.is_enum());
        assert_eq!(status.enum_values, vec!["Active".to_string(), "Retired".to_string()]);

        let account = catalog.load_type("Contoso.Account").unwrap();
        assert_eq!(account.properties[0].metadata.serialized_name.as_deref(), Some("id"));
        assert!(account.properties[0].metadata.is_required);
        assert!(account.properties[1].metadata.is_read_only);
    }

    #[test]
    fn test_load_invalid_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let mut catalog = TypeCatalog::new();
        assert!(matches!(catalog.load_manifest(&path), Err(Error::Manifest { .. })));
    }
}
