use crate::config::DuplicatePolicy;
use crate::entry::EntryOrigin;
use crate::error::{MergeError, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Entry names taken so far in one pass, with the origin that took each.
///
/// Shared by merge and inspect so both agree on which entries survive.
#[derive(Debug)]
pub(crate) struct EntryNames {
    names: HashMap<String, EntryOrigin>,
    policy: DuplicatePolicy,
    skipped: usize,
}

impl EntryNames {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            names: HashMap::new(),
            policy,
            skipped: 0,
        }
    }

    /// Reserve `name` for `origin`.
    ///
    /// Returns `Ok(false)` when the entry must be skipped: a repeated
    /// directory placeholder, or a repeated file under `KeepFirst`.
    pub fn claim(&mut self, name: &str, origin: &EntryOrigin) -> Result<bool> {
        let Some(first) = self.names.get(name) else {
            self.names.insert(name.to_string(), origin.clone());
            return Ok(true);
        };

        if name.ends_with('/') {
            debug!(entry = name, "duplicate directory entry skipped");
            self.skipped += 1;
            return Ok(false);
        }

        match self.policy {
            DuplicatePolicy::Fail => Err(MergeError::Collision {
                name: name.to_string(),
                first: first.to_string(),
                second: origin.to_string(),
            }),
            DuplicatePolicy::KeepFirst => {
                warn!(entry = name, kept = %first, skipped = %origin, "duplicate entry skipped");
                self.skipped += 1;
                Ok(false)
            }
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
