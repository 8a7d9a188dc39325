use jarweave_plugin::{FlowTaskMap, MergedMetadata, RouteMapSet};

/// Pass-scoped accumulator for harvested metadata.
///
/// Owned by a single merge pass and mutated only from its commit loop, so
/// flow-task last-write-wins follows input-traversal order.
#[derive(Debug, Default)]
pub struct MetadataAggregator {
    route_maps: RouteMapSet,
    flow_tasks: FlowTaskMap,
}

impl MetadataAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the fragment was already present.
    pub fn add_route_map(&mut self, value: impl Into<String>) -> bool {
        self.route_maps.insert(value.into())
    }

    /// Merge declarations, replacing earlier values for the same task.
    pub fn add_flow_task_entries(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        for (task, depends_on) in entries {
            self.flow_tasks.insert(task, depends_on);
        }
    }

    pub fn finalize(self) -> MergedMetadata {
        MergedMetadata {
            route_maps: self.route_maps,
            flow_tasks: self.flow_tasks,
        }
    }
}
