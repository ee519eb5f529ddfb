//! Document variants: the named flavors (API version, audience, ...) a run produces documents for.

use crate::error::VariantConflictError;
use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies one generated document.
///
/// Identity is the `(title, categorizer)` pair; `attributes` ride along but are not part of
/// equality or hashing, so they can be filled in after the variant is used as a map key.
#[derive(Debug, Clone, Default)]
pub struct DocumentVariantInfo {
    pub title: String,
    /// Name of the XML element that selects this variant (empty for the default variant)
    pub categorizer: String,
    pub attributes: IndexMap<String, String>,
}

impl DocumentVariantInfo {
    pub fn new(categorizer: &str, title: &str) -> Self {
        Self {
            title: title.to_string(),
            categorizer: categorizer.to_string(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: IndexMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// True for the variant every operation belongs to
    pub fn is_default(&self) -> bool {
        self.title.is_empty() && self.categorizer.is_empty()
    }

    /// Unions `other`'s attributes into this variant.
    ///
    /// An empty side adopts the other side's attributes; two non-empty sets must hold the same
    /// keys and values regardless of order.
    ///
    /// # Errors
    ///
    /// Returns [`VariantConflictError`] when both attribute sets are non-empty and differ.
    pub fn merge_attributes(
        &mut self,
        other: &DocumentVariantInfo,
    ) -> Result<(), VariantConflictError> {
        if other.attributes.is_empty() {
            return Ok(());
        }
        if self.attributes.is_empty() {
            self.attributes = other.attributes.clone();
            return Ok(());
        }
        if self.attributes.len() == other.attributes.len()
            && other
                .attributes
                .iter()
                .all(|(key, value)| self.attributes.get(key) == Some(value))
        {
            return Ok(());
        }

        Err(VariantConflictError {
            title: self.title.clone(),
            categorizer: self.categorizer.clone(),
            existing: format_attributes(&self.attributes),
            conflicting: format_attributes(&other.attributes),
        })
    }
}

fn format_attributes(attributes: &IndexMap<String, String>) -> String {
    let pairs: Vec<String> = attributes
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

impl PartialEq for DocumentVariantInfo {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.categorizer == other.categorizer
    }
}

impl Eq for DocumentVariantInfo {}

impl Hash for DocumentVariantInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.categorizer.hash(state);
    }
}

impl fmt::Display for DocumentVariantInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            write!(f, "<default>")
        } else {
            write!(f, "{}:{}", self.categorizer, self.title)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn attributes(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_identity_ignores_attributes() {
        let plain = DocumentVariantInfo::new("swagger", "v1");
        let decorated = DocumentVariantInfo::new("swagger", "v1")
            .with_attributes(attributes(&[("version", "1")]));

        assert_eq!(plain, decorated);
        let set: HashSet<_> = [plain, decorated].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_ne!(
            DocumentVariantInfo::new("swagger", "v2"),
            DocumentVariantInfo::new("swagger", "v1")
        );
    }

    #[test]
    fn test_merge_into_empty_adopts_attributes() {
        let mut existing = DocumentVariantInfo::new("swagger", "v1");
        let declared = DocumentVariantInfo::new("swagger", "v1")
            .with_attributes(attributes(&[("version", "1")]));

        existing.merge_attributes(&declared).unwrap();
        assert_eq!(existing.attributes, attributes(&[("version", "1")]));

        // Empty incoming side is a no-op
        existing
            .merge_attributes(&DocumentVariantInfo::new("swagger", "v1"))
            .unwrap();
        assert_eq!(existing.attributes.len(), 1);
    }

    #[test]
    fn test_merge_equivalent_attributes_in_any_order() {
        let mut existing = DocumentVariantInfo::new("swagger", "v1")
            .with_attributes(attributes(&[("a", "1"), ("b", "2")]));
        let declared = DocumentVariantInfo::new("swagger", "v1")
            .with_attributes(attributes(&[("b", "2"), ("a", "1")]));

        assert!(existing.merge_attributes(&declared).is_ok());
    }

    #[test]
    fn test_merge_conflicting_attributes() {
        let mut existing = DocumentVariantInfo::new("swagger", "v1")
            .with_attributes(attributes(&[("version", "1")]));
        let declared = DocumentVariantInfo::new("swagger", "v1")
            .with_attributes(attributes(&[("audience", "public")]));

        let error = existing.merge_attributes(&declared).unwrap_err();
        assert_eq!(error.kind(), "ConflictingDocumentVariantAttributes");
        assert_eq!(error.existing, "{version=1}");
        assert_eq!(error.conflicting, "{audience=public}");
        assert_eq!(existing.attributes, attributes(&[("version", "1")]));
    }
}
