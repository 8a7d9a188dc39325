mod inspect;
mod merge;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jarweave",
    version,
    about = "Merge compiled-class archives and harvest router metadata",
    long_about = "jarweave consolidates class archives and class directories into a single archive. \
                  Along the way it harvests route-map fragments and flow-task declarations from \
                  generated holder classes, checks the flow-task dependency graph, and rewrites \
                  the service-provider injector with the merged metadata."
)]
pub struct Cli {
    /// Mirror log output to stderr
    #[arg(long, global = true)]
    pub stderr_log: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge archives and class directories into one output archive
    #[command(
        long_about = "Merges every input into OUTPUT. Archives are read first, then directories, \
                      each group in the order given. The injector entry is rewritten and written last."
    )]
    Merge {
        /// Input archive (repeatable)
        #[arg(long = "jar", value_name = "ARCHIVE")]
        jars: Vec<PathBuf>,
        /// Input class directory (repeatable)
        #[arg(long = "dir", value_name = "DIRECTORY")]
        dirs: Vec<PathBuf>,
        /// Output archive, replaced only when the merge succeeds
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,
        /// JSON configuration file
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Write the merge report as JSON
        #[arg(long, value_name = "REPORT")]
        report: Option<PathBuf>,
        /// Keep the first of two entries with the same name instead of failing
        #[arg(long)]
        allow_duplicates: bool,
        /// Do not fail on cyclic flow-task dependencies
        #[arg(long)]
        no_cycle_check: bool,
    },
    /// Scan inputs and print harvested metadata without writing an archive
    Inspect {
        /// Archives or class directories
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
        /// JSON configuration file
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Merge { .. } => "merge",
        Commands::Inspect { .. } => "inspect",
    };
    let _guard = jarweave_runtime::init_logging(component, cli.stderr_log);

    match cli.command {
        Commands::Merge {
            jars,
            dirs,
            output,
            config,
            report,
            allow_duplicates,
            no_cycle_check,
        } => merge::run(merge::MergeArgs {
            jars,
            dirs,
            output,
            config,
            report,
            allow_duplicates,
            no_cycle_check,
        }),
        Commands::Inspect { paths, config } => inspect::run(paths, config),
    }
}

/// Load the config file if given, defaults otherwise.
fn load_config(path: Option<&PathBuf>) -> jarweave_core::Result<jarweave_core::MergeConfig> {
    match path {
        Some(path) => jarweave_core::MergeConfig::load(path),
        None => Ok(jarweave_core::MergeConfig::default()),
    }
}
