use crate::BoxError;
use crate::rules::HolderKind;

/// Outcome of scanning one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    NotMatched,
    RouteMapValue(String),
    /// Raw JSON object literal, decoded by the caller.
    ServiceProviderValue(String),
}

/// Class field scanner - knows how to read constant fields out of a
/// compiled class.
///
/// Implementations must be pure functions of the entry name and bytes; the
/// merge pass calls `scan` from several worker threads at once.
pub trait ClassScanner: Send + Sync {
    /// Cheap name-only check. Entries returning `None` are never read into
    /// memory and never passed to `scan`.
    fn classify(&self, entry_name: &str) -> Option<HolderKind>;

    /// Extract the holder field of a candidate entry.
    fn scan(&self, entry_name: &str, class_bytes: &[u8]) -> Result<ScanResult, BoxError>;
}
