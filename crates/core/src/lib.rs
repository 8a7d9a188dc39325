pub mod aggregate;
pub mod config;
pub mod entry;
pub mod error;
pub mod flow;
pub mod logging;
pub mod report;

mod merge;

pub use aggregate::MetadataAggregator;
pub use config::{DuplicatePolicy, MergeConfig};
pub use entry::{EntryOrigin, MergeInput, MergeRequest};
pub use error::{MergeError, Result};
pub use flow::{FlowTaskCycle, FlowTaskGraph};
pub use merge::{ArchiveMerger, decode_flow_tasks};
pub use report::{InjectorOutcome, Inspection, MergeReport, ScanFailure};
