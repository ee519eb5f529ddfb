use crate::naming::PropertyNaming;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Knobs for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationSettings {
    /// `info.version` written into every document
    pub info_version: String,
    /// `openapi` version field of every document
    pub openapi_version: String,
    pub property_naming: PropertyNaming,
    /// Content type used when a request body or response names none
    pub default_content_type: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            info_version: "1.0.0".to_string(),
            openapi_version: "3.0.1".to_string(),
            property_naming: PropertyNaming::Default,
            default_content_type: "application/json".to_string(),
        }
    }
}

impl GenerationSettings {
    /// Loads settings from a YAML or JSON file, chosen by extension; missing keys keep defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialized.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading generation settings from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        let settings = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON settings in {}", path.display()))?,
            _ => serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML settings in {}", path.display()))?,
        };
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.yaml");
        fs::write(&path, "infoVersion: 2.1.0\npropertyNaming: camelCase\n").unwrap();

        let settings = GenerationSettings::from_file(&path).unwrap();
        assert_eq!(settings.info_version, "2.1.0");
        assert_eq!(settings.property_naming, PropertyNaming::CamelCase);
        assert_eq!(settings.default_content_type, "application/json");
    }

    #[test]
    fn test_json_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{ "openapiVersion": "3.0.3" }"#).unwrap();

        let settings = GenerationSettings::from_file(&path).unwrap();
        assert_eq!(settings.openapi_version, "3.0.3");
    }

    #[test]
    fn test_missing_file() {
        let result = GenerationSettings::from_file(Path::new("/nonexistent/settings.yaml"));
        assert!(result.is_err());
    }
}
