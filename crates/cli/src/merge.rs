use jarweave_core::{DuplicatePolicy, InjectorOutcome, MergeReport, MergeRequest};
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::info;

pub struct MergeArgs {
    pub jars: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub allow_duplicates: bool,
    pub no_cycle_check: bool,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn run(args: MergeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(args.config.as_ref())?;
    if args.allow_duplicates {
        config.duplicate_policy = DuplicatePolicy::KeepFirst;
    }
    if args.no_cycle_check {
        config.check_flow_task_cycles = false;
    }

    let merger = jarweave_runtime::build_default_merger(config)?;
    let request = MergeRequest::new(args.jars, args.dirs, args.output);
    let report = merger.merge(&request)?;

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!("Report written to: {}", path.display());
    }

    println!("{}", Table::new(summary(&report)));
    Ok(())
}

fn summary(report: &MergeReport) -> Vec<SummaryRow> {
    let injector = match &report.injector {
        InjectorOutcome::Absent => "absent".to_string(),
        InjectorOutcome::Rewritten { name, .. } => format!("rewritten ({name})"),
        InjectorOutcome::PassedThrough { name, reason, .. } => {
            format!("passed through ({name}): {reason}")
        }
    };

    vec![
        SummaryRow {
            metric: "Output",
            value: report.output.display().to_string(),
        },
        SummaryRow {
            metric: "Entries",
            value: report.entries_written.to_string(),
        },
        SummaryRow {
            metric: "Scanned",
            value: report.entries_scanned.to_string(),
        },
        SummaryRow {
            metric: "Scan failures",
            value: report.scan_failures.to_string(),
        },
        SummaryRow {
            metric: "Duplicates skipped",
            value: report.duplicates_skipped.to_string(),
        },
        SummaryRow {
            metric: "Route maps",
            value: report.metadata.route_maps.len().to_string(),
        },
        SummaryRow {
            metric: "Flow tasks",
            value: report.metadata.flow_tasks.len().to_string(),
        },
        SummaryRow {
            metric: "Injector",
            value: injector,
        },
        SummaryRow {
            metric: "Time",
            value: format!("{} ms", report.total_duration.as_millis()),
        },
    ]
}
