use crate::flow::FlowTaskGraph;
use jarweave_plugin::MergedMetadata;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// What happened to the injector entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InjectorOutcome {
    /// No input carried an injector entry.
    #[default]
    Absent,
    Rewritten { name: String, origin: String },
    /// Rewriting failed and the source bytes were appended instead.
    PassedThrough {
        name: String,
        origin: String,
        reason: String,
    },
}

/// Result of a merge pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    pub output: PathBuf,
    /// Entries written, the injector included
    pub entries_written: usize,
    /// Candidate entries handed to the class scanner
    pub entries_scanned: usize,
    /// Candidates copied through without harvesting metadata
    pub scan_failures: usize,
    /// Duplicate directory placeholders and, under `keep_first`, duplicate files
    pub duplicates_skipped: usize,
    /// Injector entries after the first one
    pub injectors_ignored: usize,
    pub metadata: MergedMetadata,
    pub graph: FlowTaskGraph,
    /// Present when the cycle check ran
    pub task_order: Option<Vec<String>>,
    pub injector: InjectorOutcome,
    pub merge_duration: Duration,
    pub check_duration: Duration,
    pub total_duration: Duration,
}

/// A candidate entry that was copied without harvesting metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub entry: String,
    pub reason: String,
}

/// Result of scanning inputs without producing an archive.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inspection {
    pub entries: usize,
    pub entries_scanned: usize,
    /// Duplicate entries a merge would skip; their metadata is not counted
    pub duplicates_skipped: usize,
    pub failures: Vec<ScanFailure>,
    /// Origin of the injector entry that a merge would rewrite
    pub injector: Option<String>,
    pub metadata: MergedMetadata,
    pub graph: FlowTaskGraph,
    /// `(task, dependency)` pairs naming undeclared tasks
    pub dangling: Vec<(String, String)>,
    pub task_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}
