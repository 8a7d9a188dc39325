use crate::BoxError;
use crate::model::MergedMetadata;

/// Regenerates the injector class once every other entry has been written.
pub trait InjectorRewriter: Send + Sync {
    /// Produce the replacement class body. The output must be derived from
    /// `source`, not a verbatim copy of it.
    fn rewrite(&self, source: &[u8], metadata: &MergedMetadata) -> Result<Vec<u8>, BoxError>;
}
