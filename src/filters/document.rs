//! Document filters: assembly name, servers and member summaries.

use super::{non_empty_text, DocumentFilter, DocumentFilterSettings};
use crate::error::FilterError;
use crate::naming::sanitize;
use crate::openapi::{OpenApiDocument, Schema, Server};
use crate::xml::XmlElement;
use log::debug;
use url::Url;

/// `<assembly><name>` becomes `info.title`, `info.version` comes from the settings
pub struct AssemblyNameToInfoFilter;

impl DocumentFilter for AssemblyNameToInfoFilter {
    fn apply(
        &self,
        document: &mut OpenApiDocument,
        xml_documents: &[XmlElement],
        settings: &DocumentFilterSettings<'_>,
    ) -> Result<(), FilterError> {
        if document.info.title.is_empty() {
            let assembly = xml_documents
                .iter()
                .filter_map(|doc| doc.first_element("assembly"))
                .filter_map(|assembly| assembly.first_element("name"))
                .find_map(|name| non_empty_text(name, &[]));
            if let Some(assembly) = assembly {
                document.info.title = if settings.variant.title.is_empty() {
                    assembly
                } else {
                    format!("{} - {}", assembly, settings.variant.title)
                };
            }
        }
        if document.info.version.is_empty() {
            document.info.version = settings.settings.info_version.clone();
        }
        Ok(())
    }
}

/// Every distinct `scheme://host[:port]` found in a `<url>` becomes a server
pub struct UrlToServerFilter;

impl UrlToServerFilter {
    fn base_url(raw: &str) -> Option<String> {
        let url = Url::parse(raw.trim()).ok()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        })
    }
}

impl DocumentFilter for UrlToServerFilter {
    fn apply(
        &self,
        document: &mut OpenApiDocument,
        xml_documents: &[XmlElement],
        _settings: &DocumentFilterSettings<'_>,
    ) -> Result<(), FilterError> {
        for doc in xml_documents {
            for url in doc.descendants_named("url") {
                let raw = url.text();
                let Some(base) = Self::base_url(&raw) else {
                    debug!("Skipping malformed url {:?}", raw.trim());
                    continue;
                };
                if !document.servers.iter().any(|server| server.url == base) {
                    document.servers.push(Server {
                        url: base,
                        description: None,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Member `<summary>` tags back-fill schema descriptions.
///
/// `P:`/`F:` members describe properties, `T:` members describe the schema itself. A summary
/// on an open generic type applies to every registered instantiation of it.
pub struct MemberSummaryToSchemaDescriptionFilter;

impl MemberSummaryToSchemaDescriptionFilter {
    /// Schemas registered for `type_name` or any generic instantiation of it
    fn matching_schemas<'d>(
        document: &'d mut OpenApiDocument,
        type_name: &str,
    ) -> impl Iterator<Item = &'d mut Schema> {
        let sanitized = sanitize(type_name);
        document
            .components
            .schemas
            .iter_mut()
            .filter(move |(key, _)| {
                key.as_str() == sanitized
                    || key
                        .strip_prefix(sanitized.as_str())
                        .is_some_and(|rest| rest.starts_with('_') || rest.starts_with('-'))
            })
            .map(|(_, schema)| schema)
    }

    /// Schema property name of a declared member, honoring serialized names and naming policy
    fn property_name(
        type_name: &str,
        member: &str,
        settings: &DocumentFilterSettings<'_>,
    ) -> String {
        settings
            .resolver
            .load_type(type_name)
            .and_then(|descriptor| {
                descriptor
                    .properties
                    .iter()
                    .find(|property| property.name == member)
                    .map(|property| settings.settings.property_naming.resolve(property))
            })
            .unwrap_or_else(|| member.to_string())
    }
}

impl DocumentFilter for MemberSummaryToSchemaDescriptionFilter {
    fn apply(
        &self,
        document: &mut OpenApiDocument,
        xml_documents: &[XmlElement],
        settings: &DocumentFilterSettings<'_>,
    ) -> Result<(), FilterError> {
        for member in xml_documents.iter().flat_map(|doc| doc.descendants_named("member")) {
            let Some((kind, id)) = member
                .attribute("name")
                .and_then(|name| name.split_once(':'))
            else {
                continue;
            };
            let Some(summary) = member
                .first_element("summary")
                .and_then(|summary| non_empty_text(summary, &[]))
            else {
                continue;
            };

            match kind {
                "T" => {
                    for schema in Self::matching_schemas(document, id) {
                        if schema.description.is_none() {
                            schema.description = Some(summary.clone());
                        }
                    }
                }
                "P" | "F" => {
                    // Indexers such as P:Ns.Type.Item(System.Int32) have no schema property
                    if id.contains('(') {
                        continue;
                    }
                    let Some((type_name, member_name)) = id.rsplit_once('.') else {
                        continue;
                    };
                    let property = Self::property_name(type_name, member_name, settings);
                    for schema in Self::matching_schemas(document, type_name) {
                        if let Some(target) = schema.properties.get_mut(&property) {
                            if target.description.is_none() {
                                target.description = Some(summary.clone());
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}
