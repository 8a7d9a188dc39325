//! Name-based classification of archive entries.

use regex::Regex;
use serde::Serialize;

/// The two kinds of metadata-carrying classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderKind {
    RouteMap,
    ServiceProvider,
}

/// Entry-name predicates plus the names of the constant fields to extract.
///
/// Matching is by name only, so a match is conservative: the class may still
/// turn out not to carry the field.
#[derive(Debug, Clone)]
pub struct HolderRules {
    route_map: Regex,
    service_provider: Regex,
    route_map_field: String,
    flow_task_field: String,
}

impl HolderRules {
    pub fn new(
        route_map_pattern: &str,
        service_provider_pattern: &str,
        route_map_field: impl Into<String>,
        flow_task_field: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            route_map: Regex::new(route_map_pattern)?,
            service_provider: Regex::new(service_provider_pattern)?,
            route_map_field: route_map_field.into(),
            flow_task_field: flow_task_field.into(),
        })
    }

    /// Route-map holders win when both patterns match.
    pub fn classify(&self, entry_name: &str) -> Option<HolderKind> {
        if self.route_map.is_match(entry_name) {
            Some(HolderKind::RouteMap)
        } else if self.service_provider.is_match(entry_name) {
            Some(HolderKind::ServiceProvider)
        } else {
            None
        }
    }

    pub fn field_for(&self, kind: HolderKind) -> &str {
        match kind {
            HolderKind::RouteMap => &self.route_map_field,
            HolderKind::ServiceProvider => &self.flow_task_field,
        }
    }

    pub fn route_map_field(&self) -> &str {
        &self.route_map_field
    }

    pub fn flow_task_field(&self) -> &str {
        &self.flow_task_field
    }
}
