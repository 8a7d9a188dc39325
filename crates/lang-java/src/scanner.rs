use crate::constant::{parse_class, static_constant};
use jarweave_plugin::{BoxError, ClassScanner, HolderKind, HolderRules, ScanResult};
use tracing::debug;

/// Reads the holder field out of route-map and service-provider classes.
pub struct ClassFieldScanner {
    rules: HolderRules,
}

impl ClassFieldScanner {
    pub fn new(rules: HolderRules) -> Self {
        Self { rules }
    }
}

impl ClassScanner for ClassFieldScanner {
    fn classify(&self, entry_name: &str) -> Option<HolderKind> {
        self.rules.classify(entry_name)
    }

    fn scan(&self, entry_name: &str, class_bytes: &[u8]) -> Result<ScanResult, BoxError> {
        let Some(kind) = self.classify(entry_name) else {
            return Ok(ScanResult::NotMatched);
        };

        let class = parse_class(class_bytes)?;
        let field = self.rules.field_for(kind);
        let Some(value) = static_constant(&class, field)? else {
            debug!(entry = entry_name, field, "holder matched by name but has no constant");
            return Ok(ScanResult::NotMatched);
        };

        Ok(match kind {
            HolderKind::RouteMap => ScanResult::RouteMapValue(value),
            HolderKind::ServiceProvider => ScanResult::ServiceProviderValue(value),
        })
    }
}
