use crate::type_resolver::{
    PropertyDefinition, TypeDefinition, TypeKind, DICTIONARY, LIST, SYSTEM_NULLABLE, SYSTEM_OBJECT,
    SYSTEM_STRING,
};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use syn::{Fields, GenericArgument, Item, PathArguments, Type};

/// Reads Rust contract sources into type definitions.
///
/// Contract sources are ordinary Rust files declaring the request and response types of an
/// API. The parser uses `syn` to walk their items:
///
/// - `struct`s with named fields become classes, each field a property
/// - `enum`s whose variants are all unit variants become enums
/// - generic type parameters become generic parameters
/// - inline `mod` blocks contribute to the namespace (`mod contoso { struct User }` declares
///   `contoso.User`)
///
/// Field types are translated to reflected type names (`Vec<T>` becomes
/// ``System.Collections.Generic.List`1[T]``), and `#[serde(...)]` attributes are honored for
/// `rename`, `rename_all`, `skip`, `skip_serializing` and `default`.
///
/// # Example
///
/// ```no_run
/// use xmldoc_openapi::parser::ContractParser;
/// use std::path::Path;
///
/// let parsed = ContractParser::parse_file(Path::new("contracts/models.rs")).unwrap();
/// println!("Found {} types", parsed.definitions.len());
/// ```
pub struct ContractParser;

/// A successfully parsed contract file
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Type definitions declared in the file, in source order
    pub definitions: Vec<TypeDefinition>,
}

impl ContractParser {
    /// Parses a single Rust contract file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the Rust source file to parse
    ///
    /// # Returns
    ///
    /// Returns a `ParsedFile` with every struct and unit enum the file declares.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing contract file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let syntax_tree = syn::parse_file(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        let mut definitions = Vec::new();
        collect_items(&syntax_tree.items, &[], &mut definitions);
        debug!(
            "Found {} type definitions in {}",
            definitions.len(),
            path.display()
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            definitions,
        })
    }

    /// Parses multiple contract files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings so that the remaining sources still
    /// contribute their types.
    ///
    /// # Arguments
    ///
    /// * `paths` - Slice of file paths to parse
    ///
    /// # Returns
    ///
    /// Returns one `Result<ParsedFile>` per input path, in input order.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} contract files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

fn collect_items(items: &[Item], namespace: &[String], definitions: &mut Vec<TypeDefinition>) {
    for item in items {
        match item {
            Item::Struct(item) => {
                if let Some(definition) = struct_definition(item, namespace) {
                    definitions.push(definition);
                }
            }
            Item::Enum(item) => {
                if let Some(definition) = enum_definition(item, namespace) {
                    definitions.push(definition);
                }
            }
            Item::Mod(item) => {
                if let Some((_, content)) = &item.content {
                    let mut nested = namespace.to_vec();
                    nested.push(item.ident.to_string());
                    collect_items(content, &nested, definitions);
                }
            }
            _ => {}
        }
    }
}

fn qualified_name(namespace: &[String], ident: &syn::Ident) -> String {
    if namespace.is_empty() {
        ident.to_string()
    } else {
        format!("{}.{}", namespace.join("."), ident)
    }
}

fn type_parameters(generics: &syn::Generics) -> Vec<String> {
    generics
        .type_params()
        .map(|param| param.ident.to_string())
        .collect()
}

fn struct_definition(item: &syn::ItemStruct, namespace: &[String]) -> Option<TypeDefinition> {
    let Fields::Named(fields) = &item.fields else {
        debug!("Skipping struct {} without named fields", item.ident);
        return None;
    };
    let name = qualified_name(namespace, &item.ident);
    let generic_parameters = type_parameters(&item.generics);
    let container = SerdeAttributes::parse(&item.attrs);

    let properties = fields
        .named
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?;
            let field_name = ident.to_string();
            let field_name = field_name.strip_prefix("r#").unwrap_or(&field_name).to_string();
            let attributes = SerdeAttributes::parse(&field.attrs);
            let mapped = map_type(&field.ty, &generic_parameters);

            let json_name = attributes.rename.clone().or_else(|| {
                container
                    .rename_all
                    .map(|rule| rule.apply_to_field(&field_name))
                    .filter(|renamed| renamed != &field_name)
            });

            Some(PropertyDefinition {
                json_name,
                required: !mapped.optional && !attributes.default && !container.default,
                ignored: attributes.skip,
                ..PropertyDefinition::new(&field_name, &mapped.name)
            })
        })
        .collect();

    debug!("Parsed struct {}", name);
    Some(TypeDefinition {
        name,
        kind: TypeKind::Class,
        generic_parameters,
        properties,
        ..TypeDefinition::default()
    })
}

fn enum_definition(item: &syn::ItemEnum, namespace: &[String]) -> Option<TypeDefinition> {
    let name = qualified_name(namespace, &item.ident);
    if item
        .variants
        .iter()
        .any(|variant| !matches!(variant.fields, Fields::Unit))
    {
        warn!("Skipping enum {} with data-carrying variants", name);
        return None;
    }
    let container = SerdeAttributes::parse(&item.attrs);

    let enum_values = item
        .variants
        .iter()
        .filter_map(|variant| {
            let attributes = SerdeAttributes::parse(&variant.attrs);
            if attributes.skip {
                return None;
            }
            let ident = variant.ident.to_string();
            Some(attributes.rename.unwrap_or_else(|| match container.rename_all {
                Some(rule) => rule.apply_to_variant(&ident),
                None => ident,
            }))
        })
        .collect();

    debug!("Parsed enum {}", name);
    Some(TypeDefinition {
        name,
        kind: TypeKind::Enum,
        enum_values,
        ..TypeDefinition::default()
    })
}

/// Reflected name of a Rust field type
#[derive(Debug, PartialEq)]
struct MappedType {
    name: String,
    /// Declared as `Option<T>`
    optional: bool,
}

impl MappedType {
    fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }
}

fn map_type(ty: &Type, generic_parameters: &[String]) -> MappedType {
    match ty {
        Type::Path(type_path) => map_path(&type_path.path, generic_parameters),
        Type::Reference(reference) => map_type(&reference.elem, generic_parameters),
        Type::Paren(paren) => map_type(&paren.elem, generic_parameters),
        Type::Group(group) => map_type(&group.elem, generic_parameters),
        Type::Array(array) => {
            MappedType::required(format!("{}[]", map_type(&array.elem, generic_parameters).name))
        }
        Type::Slice(slice) => {
            MappedType::required(format!("{}[]", map_type(&slice.elem, generic_parameters).name))
        }
        _ => MappedType::required(SYSTEM_OBJECT),
    }
}

fn map_path(path: &syn::Path, generic_parameters: &[String]) -> MappedType {
    let Some(segment) = path.segments.last() else {
        return MappedType::required(SYSTEM_OBJECT);
    };
    let ident = segment.ident.to_string();
    let arguments: Vec<String> = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(map_type(ty, generic_parameters).name),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    if generic_parameters.contains(&ident) {
        return MappedType::required(ident);
    }
    if let Some(system) = system_type(&ident) {
        return MappedType::required(system);
    }

    match (ident.as_str(), arguments.as_slice()) {
        ("Option", [inner]) => MappedType {
            name: if is_value_type(inner) {
                format!("{}[{}]", SYSTEM_NULLABLE, inner)
            } else {
                inner.clone()
            },
            optional: true,
        },
        ("Box" | "Rc" | "Arc" | "Cow", [inner]) => MappedType::required(inner.clone()),
        ("Vec" | "VecDeque" | "LinkedList", [item]) => {
            MappedType::required(format!("{}[{}]", LIST, item))
        }
        ("HashSet" | "BTreeSet" | "IndexSet", [item]) => MappedType::required(format!(
            "System.Collections.Generic.HashSet`1[{}]",
            item
        )),
        ("HashMap" | "BTreeMap" | "IndexMap", [key, value]) => {
            MappedType::required(format!("{}[{},{}]", DICTIONARY, key, value))
        }
        ("Value" | "Map", _) => MappedType::required(SYSTEM_OBJECT),
        (_, []) => MappedType::required(ident),
        (_, arguments) => MappedType::required(format!(
            "{}`{}[{}]",
            ident,
            arguments.len(),
            arguments.join(",")
        )),
    }
}

fn system_type(ident: &str) -> Option<&'static str> {
    let name = match ident {
        "String" | "str" => SYSTEM_STRING,
        "bool" => "System.Boolean",
        "char" => "System.Char",
        "u8" => "System.Byte",
        "i8" => "System.SByte",
        "i16" => "System.Int16",
        "u16" => "System.UInt16",
        "i32" => "System.Int32",
        "u32" => "System.UInt32",
        "i64" | "isize" | "i128" => "System.Int64",
        "u64" | "usize" | "u128" => "System.UInt64",
        "f32" => "System.Single",
        "f64" => "System.Double",
        "Decimal" => "System.Decimal",
        "Uuid" => "System.Guid",
        "DateTime" | "NaiveDateTime" | "NaiveDate" | "SystemTime" | "PrimitiveDateTime" => {
            "System.DateTime"
        }
        "OffsetDateTime" => "System.DateTimeOffset",
        _ => return None,
    };
    Some(name)
}

fn is_value_type(name: &str) -> bool {
    name.starts_with("System.")
        && name != SYSTEM_STRING
        && name != SYSTEM_OBJECT
        && !name.contains('`')
        && !name.ends_with("[]")
}

/// The subset of `#[serde(...)]` that changes the serialized shape of a type
#[derive(Debug, Default)]
struct SerdeAttributes {
    rename: Option<String>,
    rename_all: Option<RenameRule>,
    skip: bool,
    default: bool,
}

impl SerdeAttributes {
    fn parse(attrs: &[syn::Attribute]) -> Self {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    parsed.rename = Some(value.value());
                } else if meta.path.is_ident("rename_all") && meta.input.peek(syn::Token![=]) {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    parsed.rename_all = RenameRule::parse(&value.value());
                    if parsed.rename_all.is_none() {
                        warn!("Unsupported serde rename_all rule {:?}", value.value());
                    }
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    parsed.skip = true;
                } else if meta.path.is_ident("default") {
                    parsed.default = true;
                    if meta.input.peek(syn::Token![=]) {
                        let _: syn::LitStr = meta.value()?.parse()?;
                    }
                } else if meta.input.peek(syn::Token![=]) {
                    let _: syn::Expr = meta.value()?.parse()?;
                } else if meta.input.peek(syn::token::Paren) {
                    meta.parse_nested_meta(|inner| {
                        if inner.input.peek(syn::Token![=]) {
                            let _: syn::Expr = inner.value()?.parse()?;
                        }
                        Ok(())
                    })?;
                }
                Ok(())
            });
            if let Err(e) = result {
                warn!("Ignoring unreadable serde attribute: {}", e);
            }
        }
        parsed
    }
}

/// Case conventions accepted by `#[serde(rename_all = "..")]`
#[derive(Debug, Clone, Copy, PartialEq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        let rule = match rule {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return None,
        };
        Some(rule)
    }

    /// Renames a `snake_case` field
    fn apply_to_field(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => pascal_case(field),
            RenameRule::Camel => {
                let pascal = pascal_case(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
        }
    }

    /// Renames a `PascalCase` variant
    fn apply_to_variant(self, variant: &str) -> String {
        match self {
            RenameRule::Pascal => variant.to_string(),
            RenameRule::Lower => variant.to_ascii_lowercase(),
            RenameRule::Upper => variant.to_ascii_uppercase(),
            RenameRule::Camel => {
                let mut chars = variant.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
            RenameRule::Snake
            | RenameRule::ScreamingSnake
            | RenameRule::Kebab
            | RenameRule::ScreamingKebab => {
                let mut snake = String::new();
                for (i, ch) in variant.char_indices() {
                    if i > 0 && ch.is_uppercase() {
                        snake.push('_');
                    }
                    snake.push(ch.to_ascii_lowercase());
                }
                self.apply_to_field(&snake)
            }
        }
    }
}

fn pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    fn parse(code: &str) -> Vec<TypeDefinition> {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "contracts.rs", code);
        ContractParser::parse_file(&file_path).unwrap().definitions
    }

    fn property<'d>(definition: &'d TypeDefinition, name: &str) -> &'d PropertyDefinition {
        definition
            .properties
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("no property {}", name))
    }

    #[test]
    fn test_parse_struct_fields() {
        let definitions = parse(
            r#"
            use std::collections::HashMap;

            pub struct User {
                pub id: u32,
                pub name: String,
                pub email: Option<String>,
                pub age: Option<i32>,
                pub tags: Vec<String>,
                pub scores: HashMap<String, f64>,
                pub id_bytes: [u8; 16],
                pub created: DateTime<Utc>,
            }

            pub fn get_user(id: u32) -> Option<User> {
                None
            }
        "#,
        );

        assert_eq!(definitions.len(), 1);
        let user = &definitions[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.kind, TypeKind::Class);

        let types: Vec<(&str, &str, bool)> = user
            .properties
            .iter()
            .map(|p| (p.name.as_str(), p.type_name.as_str(), p.required))
            .collect();
        assert_eq!(
            types,
            vec![
                ("id", "System.UInt32", true),
                ("name", "System.String", true),
                ("email", "System.String", false),
                ("age", "System.Nullable`1[System.Int32]", false),
                ("tags", "System.Collections.Generic.List`1[System.String]", true),
                (
                    "scores",
                    "System.Collections.Generic.Dictionary`2[System.String,System.Double]",
                    true
                ),
                ("id_bytes", "System.Byte[]", true),
                ("created", "System.DateTime", true),
            ]
        );
    }

    #[test]
    fn test_parse_generics_and_nested_modules() {
        let definitions = parse(
            r#"
            mod contoso {
                pub mod paging {
                    pub struct Page<T> {
                        pub items: Vec<T>,
                        pub next: Option<Box<Page<T>>>,
                    }
                }
                pub struct Wrapper {
                    pub users: paging::Page<User>,
                }
                pub struct Marker;
            }
        "#,
        );

        let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["contoso.paging.Page", "contoso.Wrapper"]);

        let page = &definitions[0];
        assert_eq!(page.generic_parameters, vec!["T".to_string()]);
        assert_eq!(
            property(page, "items").type_name,
            "System.Collections.Generic.List`1[T]"
        );
        assert_eq!(property(page, "next").type_name, "Page`1[T]");
        assert_eq!(property(&definitions[1], "users").type_name, "Page`1[User]");
    }

    #[test]
    fn test_parse_serde_attributes() {
        let definitions = parse(
            r#"
            use serde::{Deserialize, Serialize};

            #[derive(Serialize, Deserialize)]
            #[serde(rename_all = "camelCase")]
            pub struct Order {
                pub order_id: String,
                #[serde(rename = "total")]
                pub total_amount: f64,
                #[serde(skip)]
                pub internal_state: String,
                #[serde(default, skip_serializing_if = "Vec::is_empty")]
                pub line_items: Vec<String>,
            }
        "#,
        );

        let order = &definitions[0];
        assert_eq!(property(order, "order_id").json_name.as_deref(), Some("orderId"));
        assert_eq!(property(order, "total_amount").json_name.as_deref(), Some("total"));
        assert!(property(order, "internal_state").ignored);
        let line_items = property(order, "line_items");
        assert_eq!(line_items.json_name.as_deref(), Some("lineItems"));
        assert!(!line_items.ignored);
        assert!(!line_items.required);
    }

    #[test]
    fn test_parse_unit_enums() {
        let definitions = parse(
            r#"
            #[serde(rename_all = "snake_case")]
            pub enum Status {
                Active,
                OnHold,
                #[serde(rename = "gone")]
                Deleted,
            }

            pub enum Shape {
                Circle { radius: f64 },
                Square(f64),
            }
        "#,
        );

        assert_eq!(definitions.len(), 1);
        let status = &definitions[0];
        assert_eq!(status.kind, TypeKind::Enum);
        assert_eq!(
            status.enum_values,
            vec!["active".to_string(), "on_hold".to_string(), "gone".to_string()]
        );
    }

    #[test]
    fn test_parse_invalid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(
            &temp_dir,
            "invalid.rs",
            "pub struct User { pub id: u32 pub name: String }",
        );

        let err_msg = ContractParser::parse_file(&file_path).unwrap_err().to_string();
        assert!(err_msg.contains("Failed to parse Rust syntax"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = ContractParser::parse_file(Path::new("/nonexistent/file.rs"));

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_parse_files_batch() {
        let temp_dir = TempDir::new().unwrap();
        let paths = vec![
            create_temp_file(&temp_dir, "a.rs", "pub struct A { pub x: i64 }"),
            create_temp_file(&temp_dir, "broken.rs", "pub struct {"),
            create_temp_file(&temp_dir, "b.rs", "pub enum B { One, Two }"),
        ];

        let results = ContractParser::parse_files(&paths);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().definitions[0].enum_values.len(), 2);
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::Camel.apply_to_field("user_name"), "userName");
        assert_eq!(RenameRule::Pascal.apply_to_field("user_name"), "UserName");
        assert_eq!(RenameRule::ScreamingKebab.apply_to_field("user_name"), "USER-NAME");
        assert_eq!(RenameRule::Kebab.apply_to_variant("OnHold"), "on-hold");
        assert_eq!(RenameRule::ScreamingSnake.apply_to_variant("OnHold"), "ON_HOLD");
        assert_eq!(RenameRule::Camel.apply_to_variant("OnHold"), "onHold");
    }
}
