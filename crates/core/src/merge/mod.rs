//! The archive merge pass.
//!
//! A pass runs in two phases:
//! 1. Every input is streamed in order. Entries are staged in batches; only
//!    candidates selected by the scanner are read into memory and scanned in
//!    parallel, then the batch is committed in staged order: metadata goes to
//!    the aggregator and the raw entry to the output archive. The injector
//!    entry is not written, only its location is kept.
//! 2. The injector is rewritten from the final metadata and appended last,
//!    the flow-task graph is checked, and the output is moved into place.

mod input;
mod names;
mod sink;
mod stage;

pub use stage::decode_flow_tasks;

use crate::aggregate::MetadataAggregator;
use crate::config::MergeConfig;
use crate::entry::{EntryOrigin, InjectorRef, MergeInput, MergeRequest};
use crate::error::Result;
use crate::flow::FlowTaskGraph;
use crate::report::{InjectorOutcome, Inspection, MergeReport, ScanFailure};
use input::{InputReader, read_origin};
use jarweave_plugin::{ClassScanner, InjectorRewriter, MergedMetadata};
use names::EntryNames;
use sink::OutputSink;
use stage::{EntryOutcome, Payload, StagedEntry, scan_batch};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct ArchiveMerger {
    config: MergeConfig,
    scanner: Arc<dyn ClassScanner>,
    rewriter: Arc<dyn InjectorRewriter>,
}

impl ArchiveMerger {
    pub fn new(
        config: MergeConfig,
        scanner: Arc<dyn ClassScanner>,
        rewriter: Arc<dyn InjectorRewriter>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scanner,
            rewriter,
        })
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge all inputs of `request` into its output archive.
    pub fn merge(&self, request: &MergeRequest) -> Result<MergeReport> {
        let started = Instant::now();
        info!(
            inputs = request.inputs.len(),
            output = %request.output.display(),
            "merge started"
        );

        let mut sink = OutputSink::create(&request.output)?;
        let mut pass = Pass::new(self);
        for input in &request.inputs {
            pass.consume(input, Some(&mut sink))?;
        }

        let Pass {
            aggregator,
            names: mut entry_names,
            injector,
            stats,
            ..
        } = pass;
        let metadata = aggregator.finalize();

        let injector = match injector {
            Some(reference) => {
                self.append_injector(&reference, &metadata, &mut entry_names, &mut sink)?
            }
            None => InjectorOutcome::Absent,
        };

        let merge_duration = started.elapsed();
        info!(
            entries = sink.written(),
            route_maps = metadata.route_maps.len(),
            flow_tasks = metadata.flow_tasks.len(),
            elapsed_ms = merge_duration.as_millis() as u64,
            "merge phase finished"
        );

        let check_started = Instant::now();
        let graph = FlowTaskGraph::build(&metadata.flow_tasks);
        for (task, dependency) in graph.dangling() {
            warn!(task, dependency, "flow task depends on an undeclared task");
        }
        let task_order = if self.config.check_flow_task_cycles {
            Some(graph.check()?)
        } else {
            None
        };
        let check_duration = check_started.elapsed();
        info!(
            tasks = graph.len(),
            elapsed_ms = check_duration.as_millis() as u64,
            "flow task check finished"
        );

        let entries_written = sink.written();
        let duplicates_skipped = entry_names.skipped();
        let output = sink.finish()?;

        let total_duration = started.elapsed();
        info!(
            output = %output.display(),
            elapsed_ms = total_duration.as_millis() as u64,
            "merge finished"
        );

        Ok(MergeReport {
            output,
            entries_written,
            entries_scanned: stats.scanned,
            scan_failures: stats.failures.len(),
            duplicates_skipped,
            injectors_ignored: stats.injectors_ignored,
            metadata,
            graph,
            task_order,
            injector,
            merge_duration,
            check_duration,
            total_duration,
        })
    }

    /// Run the scan half of a pass over `inputs` without writing anything.
    ///
    /// Entry names are claimed as in `merge`, so a name collision fails here
    /// under the `fail` policy, and skipped duplicates contribute no metadata.
    pub fn inspect(&self, inputs: &[MergeInput]) -> Result<Inspection> {
        let mut pass = Pass::new(self);
        for input in inputs {
            pass.consume(input, None)?;
        }

        let metadata = pass.aggregator.finalize();
        let graph = FlowTaskGraph::build(&metadata.flow_tasks);
        let dangling = graph
            .dangling()
            .into_iter()
            .map(|(task, dep)| (task.to_string(), dep.to_string()))
            .collect();
        let (task_order, cycle) = match graph.check() {
            Ok(order) => (Some(order), None),
            Err(e) => (None, Some(e.cycle)),
        };

        Ok(Inspection {
            entries: pass.stats.entries,
            entries_scanned: pass.stats.scanned,
            duplicates_skipped: pass.names.skipped(),
            failures: pass.stats.failures,
            injector: pass.injector.map(|r| r.origin.to_string()),
            metadata,
            graph,
            dangling,
            task_order,
            cycle,
        })
    }

    fn append_injector(
        &self,
        reference: &InjectorRef,
        metadata: &MergedMetadata,
        names: &mut EntryNames,
        sink: &mut OutputSink,
    ) -> Result<InjectorOutcome> {
        let source = read_origin(&reference.origin)?;
        let name = reference.name.clone();
        let origin = reference.origin.to_string();

        let (bytes, outcome) = match self.rewriter.rewrite(&source, metadata) {
            Ok(bytes) => {
                info!(entry = %name, size = bytes.len(), "injector rewritten");
                (bytes, InjectorOutcome::Rewritten { name, origin })
            }
            Err(e) => {
                error!(entry = %name, error = %e, "injector rewrite failed, appending source bytes");
                let reason = e.to_string();
                (
                    source,
                    InjectorOutcome::PassedThrough {
                        name,
                        origin,
                        reason,
                    },
                )
            }
        };

        if names.claim(&reference.name, &reference.origin)? {
            sink.write_bytes(&reference.name, &bytes)?;
        }
        Ok(outcome)
    }
}

#[derive(Debug, Default)]
struct PassStats {
    entries: usize,
    scanned: usize,
    failures: Vec<ScanFailure>,
    injectors_ignored: usize,
}

/// State of one pass. Only the commit loop mutates it, in traversal order.
struct Pass<'a> {
    merger: &'a ArchiveMerger,
    aggregator: MetadataAggregator,
    names: EntryNames,
    injector: Option<InjectorRef>,
    stats: PassStats,
}

impl<'a> Pass<'a> {
    fn new(merger: &'a ArchiveMerger) -> Self {
        Self {
            merger,
            aggregator: MetadataAggregator::new(),
            names: EntryNames::new(merger.config.duplicate_policy),
            injector: None,
            stats: PassStats::default(),
        }
    }

    fn consume(&mut self, input: &MergeInput, mut sink: Option<&mut OutputSink>) -> Result<()> {
        let excluded: Vec<PathBuf> = sink
            .as_deref()
            .map(|sink| sink.own_paths().iter().map(|path| path.to_path_buf()).collect())
            .unwrap_or_default();
        let mut reader = InputReader::open(input, &excluded)?;
        debug!(input = %input.path().display(), entries = reader.len(), "reading input");

        let batch_size = self.merger.config.scan_batch_size;
        let mut batch = Vec::with_capacity(batch_size.min(reader.len()));
        for index in 0..reader.len() {
            let (name, origin) = reader.describe(index)?;
            self.stats.entries += 1;

            if self.merger.config.is_injector(&name) {
                self.defer_injector(name, origin);
                continue;
            }

            let payload = match self.merger.scanner.classify(&name) {
                None => Payload::Plain,
                Some(_) => match reader.read(index) {
                    Ok(bytes) => Payload::Candidate(bytes),
                    Err(e) => Payload::Unreadable(format!("cannot read entry: {e}")),
                },
            };
            batch.push(StagedEntry {
                index,
                name,
                origin,
                payload,
            });

            if batch.len() >= batch_size {
                self.commit(&mut batch, &mut reader, sink.as_deref_mut())?;
            }
        }
        self.commit(&mut batch, &mut reader, sink.as_deref_mut())
    }

    fn commit(
        &mut self,
        batch: &mut Vec<StagedEntry>,
        reader: &mut InputReader,
        mut sink: Option<&mut OutputSink>,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let outcomes = scan_batch(self.merger.scanner.as_ref(), batch);
        for (entry, outcome) in batch.drain(..).zip(outcomes) {
            if !self.names.claim(&entry.name, &entry.origin)? {
                continue;
            }
            self.record(&entry, outcome);
            if let Some(sink) = sink.as_deref_mut() {
                reader.copy_to(entry.index, &entry.name, sink)?;
            }
        }
        Ok(())
    }

    fn record(&mut self, entry: &StagedEntry, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Plain => {}
            EntryOutcome::Unmatched => {
                self.stats.scanned += 1;
            }
            EntryOutcome::RouteMap(value) => {
                self.stats.scanned += 1;
                info!(entry = %entry.origin, "route map harvested");
                self.aggregator.add_route_map(value);
            }
            EntryOutcome::FlowTasks(tasks) => {
                self.stats.scanned += 1;
                info!(entry = %entry.origin, tasks = tasks.len(), "flow tasks harvested");
                self.aggregator.add_flow_task_entries(tasks);
            }
            EntryOutcome::Failed(reason) => {
                self.stats.scanned += 1;
                warn!(entry = %entry.origin, %reason, "metadata extraction failed, entry copied unchanged");
                self.stats.failures.push(ScanFailure {
                    entry: entry.origin.to_string(),
                    reason,
                });
            }
        }
    }

    /// The first injector in traversal order wins.
    fn defer_injector(&mut self, name: String, origin: EntryOrigin) {
        match &self.injector {
            None => {
                info!(entry = %origin, "injector entry deferred");
                self.injector = Some(InjectorRef { name, origin });
            }
            Some(kept) => {
                warn!(entry = %origin, kept = %kept.origin, "additional injector entry ignored");
                self.stats.injectors_ignored += 1;
            }
        }
    }
}
