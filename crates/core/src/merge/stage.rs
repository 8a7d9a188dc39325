use crate::entry::EntryOrigin;
use jarweave_plugin::{ClassScanner, FlowTaskMap, ScanResult};
use rayon::prelude::*;

/// What was read for an entry before scanning.
pub(crate) enum Payload {
    /// Not a metadata candidate; never read into memory.
    Plain,
    Candidate(Vec<u8>),
    Unreadable(String),
}

pub(crate) struct StagedEntry {
    pub index: usize,
    pub name: String,
    pub origin: EntryOrigin,
    pub payload: Payload,
}

/// Per-entry scan result. Every outcome is still copied to the output.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum EntryOutcome {
    Plain,
    /// Candidate by name that carried no holder field.
    Unmatched,
    RouteMap(String),
    FlowTasks(FlowTaskMap),
    /// Copied but not harvested.
    Failed(String),
}

/// Scan a batch in parallel. Outcomes are returned in batch order.
pub(crate) fn scan_batch(scanner: &dyn ClassScanner, batch: &[StagedEntry]) -> Vec<EntryOutcome> {
    batch
        .par_iter()
        .map(|entry| scan_entry(scanner, entry))
        .collect()
}

fn scan_entry(scanner: &dyn ClassScanner, entry: &StagedEntry) -> EntryOutcome {
    let bytes = match &entry.payload {
        Payload::Plain => return EntryOutcome::Plain,
        Payload::Unreadable(reason) => return EntryOutcome::Failed(reason.clone()),
        Payload::Candidate(bytes) => bytes,
    };

    match scanner.scan(&entry.name, bytes) {
        Ok(ScanResult::NotMatched) => EntryOutcome::Unmatched,
        Ok(ScanResult::RouteMapValue(value)) => EntryOutcome::RouteMap(value),
        Ok(ScanResult::ServiceProviderValue(json)) => match decode_flow_tasks(&json) {
            Ok(tasks) => EntryOutcome::FlowTasks(tasks),
            Err(e) => EntryOutcome::Failed(format!("invalid flow task JSON: {e}")),
        },
        Err(e) => EntryOutcome::Failed(e.to_string()),
    }
}

/// Decode a `{"task": "dep1,dep2"}` object. Duplicate keys keep the last value.
pub fn decode_flow_tasks(json: &str) -> Result<FlowTaskMap, serde_json::Error> {
    serde_json::from_str(json)
}
