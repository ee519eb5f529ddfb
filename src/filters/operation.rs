//! Operation filters for the descriptive tags: `<group>`, `<summary>` and `<remarks>`.

use super::{non_empty_text, OperationFilter, OperationFilterSettings};
use crate::error::FilterError;
use crate::openapi::Operation;
use crate::xml::XmlElement;

/// First `<group>` becomes the operation's tag
pub struct GroupToTagFilter;

impl OperationFilter for GroupToTagFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        _settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError> {
        if !operation.tags.is_empty() {
            return Ok(());
        }
        if let Some(group) = element
            .elements_named("group")
            .find_map(|group| non_empty_text(group, &[]))
        {
            operation.tags.push(group);
        }
        Ok(())
    }
}

/// `<summary>` becomes the operation summary
pub struct SummaryToSummaryFilter;

impl OperationFilter for SummaryToSummaryFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        _settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError> {
        if operation.summary.is_none() {
            operation.summary = element
                .elements_named("summary")
                .find_map(|summary| non_empty_text(summary, &[]));
        }
        Ok(())
    }
}

/// `<remarks>` becomes the operation description
pub struct RemarksToDescriptionFilter;

impl OperationFilter for RemarksToDescriptionFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        _settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError> {
        if operation.description.is_none() {
            operation.description = element
                .elements_named("remarks")
                .find_map(|remarks| non_empty_text(remarks, &[]));
        }
        Ok(())
    }
}
