use super::PreprocessingOperationFilter;
use crate::error::FilterError;
use crate::settings::GenerationSettings;
use crate::xml::XmlElement;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static PATH_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Names of the `{templated}` segments of a path, in order
pub fn path_template_parameters(path: &str) -> Vec<String> {
    PATH_TEMPLATE
        .captures_iter(path)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Rewrites `<pathParam>`, `<queryParam>` and `<header>` into `<param in="...">`
pub struct ConvertAlternativeParamTagsFilter;

impl ConvertAlternativeParamTagsFilter {
    fn location_of(tag: &str) -> Option<&'static str> {
        match tag {
            "pathParam" => Some("path"),
            "queryParam" => Some("query"),
            "header" => Some("header"),
            _ => None,
        }
    }
}

impl PreprocessingOperationFilter for ConvertAlternativeParamTagsFilter {
    fn apply(
        &self,
        element: &mut XmlElement,
        _settings: &GenerationSettings,
    ) -> Result<(), FilterError> {
        // Direct children only: <header> inside <response> documents a response header
        for child in element.elements_mut() {
            if let Some(location) = Self::location_of(&child.name) {
                debug!("Converting <{}> into <param in=\"{}\">", child.name, location);
                child.name = "param".to_string();
                child.set_attribute("in", location);
            }
        }
        Ok(())
    }
}

/// Fills in the `in` attribute of `<param>` tags that omit it, from the operation's url
pub struct PopulateInAttributeFilter;

impl PreprocessingOperationFilter for PopulateInAttributeFilter {
    fn apply(
        &self,
        element: &mut XmlElement,
        _settings: &GenerationSettings,
    ) -> Result<(), FilterError> {
        let Some(url) = element.first_element("url").map(|url| url.text()) else {
            return Ok(());
        };
        // An unparsable url is reported by the orchestrator
        let Ok(url) = Url::parse(url.trim()) else {
            return Ok(());
        };

        let path = urlencoding::decode(url.path())
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| url.path().to_string());
        let path_parameters = path_template_parameters(&path);
        let query_parameters: Vec<String> = url
            .query_pairs()
            .map(|(key, _)| key.into_owned())
            .collect();

        for param in element.elements_mut().filter(|child| child.name == "param") {
            if param.attribute("in").is_some() {
                continue;
            }
            let Some(name) = param.attribute("name").map(str::to_string) else {
                continue;
            };
            if path_parameters.contains(&name) {
                param.set_attribute("in", "path");
            } else if query_parameters.contains(&name) {
                param.set_attribute("in", "query");
            }
        }
        Ok(())
    }
}
