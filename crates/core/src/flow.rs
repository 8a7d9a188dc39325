//! Flow-task dependency graph.
//!
//! Built from the raw `task -> "dep1, dep2"` declarations harvested from
//! service-provider holders. Building never fails; ordering validation is a
//! separate step so callers can decide whether a cycle is fatal.

use jarweave_plugin::FlowTaskMap;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cyclic flow task dependency: {}", cycle.join(" -> "))]
pub struct FlowTaskCycle {
    /// Dependency path closing on itself: each task depends on the next, and
    /// the last element repeats the first.
    pub cycle: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlowTaskGraph {
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl FlowTaskGraph {
    /// One node per declared task. Tokens are split on `,`, trimmed, and
    /// empty tokens dropped.
    pub fn build(flow_tasks: &FlowTaskMap) -> Self {
        let dependencies = flow_tasks
            .iter()
            .map(|(task, depends_on)| {
                let set = depends_on
                    .split(',')
                    .map(str::trim)
                    .filter(|dep| !dep.is_empty())
                    .map(str::to_string)
                    .collect();
                (task.clone(), set)
            })
            .collect();
        Self { dependencies }
    }

    pub fn dependencies(&self, task: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(task)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// `(task, dependency)` pairs whose dependency is not a declared task.
    pub fn dangling(&self) -> Vec<(&str, &str)> {
        self.dependencies
            .iter()
            .flat_map(|(task, deps)| {
                deps.iter()
                    .filter(|dep| !self.dependencies.contains_key(dep.as_str()))
                    .map(move |dep| (task.as_str(), dep.as_str()))
            })
            .collect()
    }

    /// Execution order with every task after its declared dependencies.
    ///
    /// Dangling dependencies are ignored. A task depending on itself counts as
    /// a cycle.
    pub fn check(&self) -> Result<Vec<String>, FlowTaskCycle> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.len());
        for task in self.tasks() {
            nodes.insert(task, graph.add_node(task));
        }
        for (task, deps) in &self.dependencies {
            let to = nodes[task.as_str()];
            for dep in deps {
                if let Some(&from) = nodes.get(dep.as_str()) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(|ix| graph[ix].to_string()).collect()),
            Err(cycle) => {
                let start = cycle.node_id();
                let cyclic: Vec<Vec<NodeIndex>> = tarjan_scc(&graph)
                    .into_iter()
                    .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
                    .collect();
                let component = cyclic
                    .iter()
                    .find(|scc| scc.contains(&start))
                    .or_else(|| cyclic.first())
                    .cloned()
                    .unwrap_or_else(|| vec![start]);
                let members: BTreeSet<&str> = component.into_iter().map(|ix| graph[ix]).collect();
                Err(FlowTaskCycle {
                    cycle: self.cycle_path(&members),
                })
            }
        }
    }

    /// Walk `depends on` edges inside one strongly connected component until a
    /// task repeats. Starts at the smallest member and always takes the
    /// smallest in-component dependency, so the path is deterministic.
    fn cycle_path(&self, members: &BTreeSet<&str>) -> Vec<String> {
        let Some(&start) = members.first() else {
            return Vec::new();
        };

        let mut path = vec![start];
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut current = start;
        loop {
            seen.insert(current, path.len() - 1);
            let next = self
                .dependencies
                .get(current)
                .and_then(|deps| deps.iter().map(String::as_str).find(|dep| members.contains(dep)));
            let Some(next) = next else {
                return members.iter().map(|task| task.to_string()).collect();
            };
            path.push(next);
            if let Some(&at) = seen.get(next) {
                return path[at..].iter().map(|task| task.to_string()).collect();
            }
            current = next;
        }
    }
}
