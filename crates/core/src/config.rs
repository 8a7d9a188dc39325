//! Merge pass configuration.

use crate::error::{MergeError, Result};
use jarweave_plugin::HolderRules;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ROUTE_MAP_PATTERN: &str = r"^a/RouterMap__TheRouter__.*\.class$";
pub const DEFAULT_SERVICE_PROVIDER_PATTERN: &str = r"^a/ServiceProvider__TheRouter__.*\.class$";
pub const DEFAULT_INJECTOR_MARKER: &str = "TheRouterServiceProvideInjecter";
pub const DEFAULT_ROUTE_MAP_FIELD: &str = "ROUTERMAP";
pub const DEFAULT_FLOW_TASK_FIELD: &str = "FLOW_TASK_JSON";

/// What to do when two non-injector file entries resolve to the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Abort the merge, naming both source locations.
    #[default]
    Fail,
    /// Keep the entry seen first in input order and log the rest.
    KeepFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Regex over entry names selecting route-map holders.
    pub route_map_pattern: String,
    /// Regex over entry names selecting service-provider holders.
    pub service_provider_pattern: String,
    /// Substring identifying the injector entry.
    pub injector_marker: String,
    pub route_map_field: String,
    pub flow_task_field: String,
    pub duplicate_policy: DuplicatePolicy,
    /// Fail the merge when the flow-task graph has a cycle.
    pub check_flow_task_cycles: bool,
    /// Entries staged per parallel scan batch.
    pub scan_batch_size: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            route_map_pattern: DEFAULT_ROUTE_MAP_PATTERN.to_string(),
            service_provider_pattern: DEFAULT_SERVICE_PROVIDER_PATTERN.to_string(),
            injector_marker: DEFAULT_INJECTOR_MARKER.to_string(),
            route_map_field: DEFAULT_ROUTE_MAP_FIELD.to_string(),
            flow_task_field: DEFAULT_FLOW_TASK_FIELD.to_string(),
            duplicate_policy: DuplicatePolicy::Fail,
            check_flow_task_cycles: true,
            scan_batch_size: 64,
        }
    }
}

impl MergeConfig {
    /// Load from a JSON file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: MergeConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan_batch_size == 0 {
            return Err(MergeError::Config("scan_batch_size must be at least 1".into()));
        }
        if self.injector_marker.is_empty() {
            return Err(MergeError::Config("injector_marker must not be empty".into()));
        }
        if self.route_map_field.is_empty() || self.flow_task_field.is_empty() {
            return Err(MergeError::Config("holder field names must not be empty".into()));
        }
        self.holder_rules().map(|_| ())
    }

    pub fn holder_rules(&self) -> Result<HolderRules> {
        HolderRules::new(
            &self.route_map_pattern,
            &self.service_provider_pattern,
            self.route_map_field.as_str(),
            self.flow_task_field.as_str(),
        )
        .map_err(|e| MergeError::Config(format!("invalid holder pattern: {e}")))
    }

    pub fn is_injector(&self, entry_name: &str) -> bool {
        entry_name.contains(&self.injector_marker)
    }
}
