use jarweave_core::{ArchiveMerger, MergeConfig, Result};
use jarweave_java::{ClassFieldScanner, ConstantFieldInjector};
use std::sync::Arc;

/// Bootstraps a merger with the Java class-file plugin.
///
/// The scanner and the injector rewriter share the holder rules derived from
/// `config`, so the injector embeds metadata under the same field names the
/// scanner reads.
pub fn build_default_merger(config: MergeConfig) -> Result<ArchiveMerger> {
    let rules = config.holder_rules()?;
    let rewriter = ConstantFieldInjector::from_rules(&rules);
    let scanner = ClassFieldScanner::new(rules);
    tracing::debug!(
        marker = %config.injector_marker,
        route_map_field = %config.route_map_field,
        flow_task_field = %config.flow_task_field,
        "building merger"
    );
    ArchiveMerger::new(config, Arc::new(scanner), Arc::new(rewriter))
}

/// Initializes the logging system for a specific component.
/// This delegates to the core logging module.
pub fn init_logging(component: &str, to_stderr: bool) -> Option<impl Drop> {
    Some(jarweave_core::logging::init_logging(component, to_stderr))
}
