use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Route-map fragments harvested from route-map holders, deduplicated by
/// exact string equality.
pub type RouteMapSet = BTreeSet<String>;

/// Task identifier to its raw comma-separated dependency declaration.
///
/// Insertion order is the order in which a task was first seen; a later
/// declaration for the same task replaces the value in place.
pub type FlowTaskMap = IndexMap<String, String>;

/// Final, read-only metadata of one merge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedMetadata {
    pub route_maps: RouteMapSet,
    pub flow_tasks: FlowTaskMap,
}

impl MergedMetadata {
    pub fn is_empty(&self) -> bool {
        self.route_maps.is_empty() && self.flow_tasks.is_empty()
    }
}
