//! Inputs of a merge pass and where each entry came from.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One input unit, in caller-supplied order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum MergeInput {
    Archive(PathBuf),
    Directory(PathBuf),
}

impl MergeInput {
    pub fn path(&self) -> &Path {
        match self {
            MergeInput::Archive(path) | MergeInput::Directory(path) => path,
        }
    }
}

/// The fixed set of inputs and the single output of one pass.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub inputs: Vec<MergeInput>,
    pub output: PathBuf,
}

impl MergeRequest {
    /// Archives first, then directories, each group in the given order.
    pub fn new(
        archives: impl IntoIterator<Item = PathBuf>,
        directories: impl IntoIterator<Item = PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        let inputs = archives
            .into_iter()
            .map(MergeInput::Archive)
            .chain(directories.into_iter().map(MergeInput::Directory))
            .collect();
        Self {
            inputs,
            output: output.into(),
        }
    }
}

/// Location of an entry in the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryOrigin {
    Archive { archive: PathBuf, entry: String },
    Directory { root: PathBuf, file: PathBuf },
}

impl fmt::Display for EntryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryOrigin::Archive { archive, entry } => write!(f, "{}!{}", archive.display(), entry),
            EntryOrigin::Directory { file, .. } => write!(f, "{}", file.display()),
        }
    }
}

/// The deferred injector entry: only its location is kept during the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectorRef {
    pub name: String,
    pub origin: EntryOrigin,
}

/// Entry name of `file` relative to `root`, with `/` separators.
pub fn relative_entry_name(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
