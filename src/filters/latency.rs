use super::{OperationFilter, OperationFilterSettings};
use crate::error::FilterError;
use crate::openapi::Operation;
use crate::xml::XmlElement;
use log::debug;
use serde_json::{Map, Value};

/// Operation extension holding the documented timeouts
pub const LATENCY_EXTENSION: &str = "x-latency-timeouts";

/// Host or class name used when the tag does not name one
pub const DEFAULT_LATENCY_KEY: &str = "default";

const TIMEOUT_TYPE: &str = "timeout";

/// `<latencies host=".."><latency class=".." type="timeout">N</latency></latencies>` becomes
/// `x-latency-timeouts: { host: { class: N } }`
pub struct LatencyToExtensionFilter;

impl OperationFilter for LatencyToExtensionFilter {
    fn apply(
        &self,
        operation: &mut Operation,
        element: &XmlElement,
        _settings: &mut OperationFilterSettings<'_, '_>,
    ) -> Result<(), FilterError> {
        let mut timeouts: Vec<(String, String, i64)> = Vec::new();
        for latencies in element.elements_named("latencies") {
            let host = latencies.attribute("host").unwrap_or(DEFAULT_LATENCY_KEY);
            for latency in latencies.elements_named("latency") {
                if latency.attribute("type").map(str::trim) != Some(TIMEOUT_TYPE) {
                    debug!("Skipping latency of type {:?}", latency.attribute("type"));
                    continue;
                }
                let class = latency.attribute("class").unwrap_or(DEFAULT_LATENCY_KEY);
                let text = latency.text();
                let value = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| FilterError::InvalidLatencyValue {
                        value: text.trim().to_string(),
                        class: class.to_string(),
                    })?;
                timeouts.push((host.to_string(), class.to_string(), value));
            }
        }
        if timeouts.is_empty() {
            return Ok(());
        }

        let extension = operation
            .extensions
            .entry(LATENCY_EXTENSION.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(hosts) = extension else {
            return Ok(());
        };
        for (host, class, value) in timeouts {
            let classes = hosts
                .entry(host)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(classes) = classes {
                classes.entry(class).or_insert(Value::from(value));
            }
        }
        Ok(())
    }
}
