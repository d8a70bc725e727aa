//! Declared-state extraction
//!
//! Turns the JSON document printed by `terraform show -json` into
//! [`ResourceCounts`]. Extraction is best effort: malformed subtrees are
//! skipped and a document without the expected wrapper yields zero counts.

use crate::model::{CoreKind, KNOWN_SUFFIXES, ResourceCounts, SERVICE_GROUPS, ServiceMetric};
use serde_json::Value;
use std::collections::HashSet;

/// (resource type, resolved id)
type DedupKey = (String, String);

/// Counts resources in a Terraform state document
#[derive(Debug, Clone, Default)]
pub struct StateTreeExtractor {
    suffix: Option<String>,
}

impl StateTreeExtractor {
    pub fn new(suffix: Option<String>) -> Self {
        Self {
            suffix: suffix.filter(|s| !s.is_empty()),
        }
    }

    /// Parse and extract; invalid JSON degrades to zero counts
    pub fn extract_str(&self, text: &str) -> ResourceCounts {
        match serde_json::from_str::<Value>(text) {
            Ok(document) => self.extract(&document),
            Err(e) => {
                tracing::warn!("Declared state is not valid JSON, treating it as empty: {}", e);
                ResourceCounts::new()
            }
        }
    }

    pub fn extract(&self, document: &Value) -> ResourceCounts {
        let mut counts = ResourceCounts::new();

        let Some(root) = document.get("values").and_then(|v| v.get("root_module")) else {
            tracing::warn!("Declared state has no values.root_module, treating it as empty");
            return counts;
        };

        let mut seen = HashSet::new();
        self.walk_module(root, &mut seen, &mut counts);

        tracing::debug!(
            "Extracted {} unique resources from declared state",
            seen.len()
        );
        counts
    }

    fn walk_module(
        &self,
        module: &Value,
        seen: &mut HashSet<DedupKey>,
        counts: &mut ResourceCounts,
    ) {
        if !module.is_object() {
            tracing::debug!("Skipping module that is not an object");
            return;
        }

        match module.get("resources") {
            Some(Value::Array(resources)) => {
                for resource in resources {
                    self.visit_resource(resource, seen, counts);
                }
            }
            Some(_) => tracing::debug!("Skipping module whose resources field is not a list"),
            None => {}
        }

        match module.get("child_modules") {
            Some(Value::Array(children)) => {
                for child in children {
                    self.walk_module(child, seen, counts);
                }
            }
            Some(_) => tracing::debug!("Skipping child_modules field that is not a list"),
            None => {}
        }
    }

    fn visit_resource(
        &self,
        resource: &Value,
        seen: &mut HashSet<DedupKey>,
        counts: &mut ResourceCounts,
    ) {
        let resource_type = resource.get("type").and_then(Value::as_str);
        let address = resource.get("address").and_then(Value::as_str);
        let (Some(resource_type), Some(address)) = (resource_type, address) else {
            tracing::debug!("Skipping resource without type or address");
            return;
        };

        let id = resolve_id(resource).unwrap_or_else(|| address.to_string());
        if !seen.insert((resource_type.to_string(), id)) {
            tracing::trace!("Skipping duplicate resource {}", address);
            return;
        }

        if let Some(kind) = CoreKind::from_resource_type(resource_type) {
            counts.increment_core(kind);
        } else if let Some(metric) = ServiceMetric::from_resource_type(resource_type) {
            match self.attribute_group(address) {
                Some(group) => counts.service_mut(group).increment(metric),
                None => tracing::debug!("No service group attributed to {}", address),
            }
        }
    }

    /// The service group a resource address belongs to
    ///
    /// With a suffix configured the address must contain it; without one,
    /// addresses carrying any known deployment suffix are not attributed.
    pub fn attribute_group(&self, address: &str) -> Option<&'static str> {
        let group = SERVICE_GROUPS
            .iter()
            .copied()
            .find(|group| address.contains(group))?;

        let attributed = match &self.suffix {
            Some(suffix) => address.contains(suffix.as_str()),
            None => !KNOWN_SUFFIXES.iter().any(|s| address.contains(s)),
        };
        attributed.then_some(group)
    }
}

/// `values.id` as a string, if present and non-empty
fn resolve_id(resource: &Value) -> Option<String> {
    match resource.get("values")?.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
