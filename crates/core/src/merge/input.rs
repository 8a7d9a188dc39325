use super::sink::OutputSink;
use crate::entry::{EntryOrigin, MergeInput, relative_entry_name};
use crate::error::{MergeError, Result};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

/// An opened input, addressed by entry index in traversal order.
pub(crate) enum InputReader {
    Archive {
        path: PathBuf,
        archive: ZipArchive<BufReader<File>>,
    },
    Directory {
        root: PathBuf,
        files: Vec<PathBuf>,
    },
}

impl InputReader {
    /// Open `input`. Directory walks leave out any file in `excluded`, which
    /// is how a pass keeps its own output out of an input directory.
    pub fn open(input: &MergeInput, excluded: &[PathBuf]) -> Result<Self> {
        match input {
            MergeInput::Archive(path) => {
                let file = File::open(path).map_err(|e| MergeError::input_open(path, e))?;
                let archive = ZipArchive::new(BufReader::new(file))
                    .map_err(|e| MergeError::input_open(path, e))?;
                Ok(InputReader::Archive {
                    path: path.clone(),
                    archive,
                })
            }
            MergeInput::Directory(root) => {
                if !root.is_dir() {
                    return Err(MergeError::input_open(
                        root,
                        io::Error::new(io::ErrorKind::NotFound, "not a directory"),
                    ));
                }

                let mut files = Vec::new();
                for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
                    let entry = entry.map_err(|e| MergeError::input_open(root, io::Error::from(e)))?;
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if is_excluded(entry.path(), excluded) {
                        debug!(file = %entry.path().display(), "skipping merge output inside input directory");
                        continue;
                    }
                    files.push(entry.into_path());
                }
                Ok(InputReader::Directory {
                    root: root.clone(),
                    files,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            InputReader::Archive { archive, .. } => archive.len(),
            InputReader::Directory { files, .. } => files.len(),
        }
    }

    /// Entry name and origin, without reading the payload.
    pub fn describe(&mut self, index: usize) -> Result<(String, EntryOrigin)> {
        match self {
            InputReader::Archive { path, archive } => {
                let entry = archive
                    .by_index_raw(index)
                    .map_err(|e| MergeError::input_read(path.as_path(), e))?;
                let name = entry.name().to_string();
                let origin = EntryOrigin::Archive {
                    archive: path.clone(),
                    entry: name.clone(),
                };
                Ok((name, origin))
            }
            InputReader::Directory { root, files } => {
                let file = &files[index];
                let name = relative_entry_name(root, file).ok_or_else(|| {
                    MergeError::input_read(
                        file.as_path(),
                        io::Error::new(io::ErrorKind::InvalidInput, "file is outside its input root"),
                    )
                })?;
                let origin = EntryOrigin::Directory {
                    root: root.clone(),
                    file: file.clone(),
                };
                Ok((name, origin))
            }
        }
    }

    /// Decompressed payload of entry `index`.
    pub fn read(&mut self, index: usize) -> std::result::Result<Vec<u8>, ZipError> {
        match self {
            InputReader::Archive { archive, .. } => {
                let mut entry = archive.by_index(index)?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
            InputReader::Directory { files, .. } => Ok(std::fs::read(&files[index])?),
        }
    }

    /// Copy entry `index` into the sink under `name`.
    ///
    /// Archive entries keep their compressed bytes; directory files are
    /// compressed with default options.
    pub fn copy_to(&mut self, index: usize, name: &str, sink: &mut OutputSink) -> Result<()> {
        match self {
            InputReader::Archive { path, archive } => {
                let entry = archive
                    .by_index_raw(index)
                    .map_err(|e| MergeError::input_read(path.as_path(), e))?;
                sink.append_with(|writer| writer.raw_copy_file(entry))
            }
            InputReader::Directory { files, .. } => {
                let path = &files[index];
                let mut file = File::open(path).map_err(|e| MergeError::input_read(path.as_path(), e))?;
                sink.append_with(|writer| {
                    writer.start_file(name, SimpleFileOptions::default())?;
                    io::copy(&mut file, writer)?;
                    Ok(())
                })
            }
        }
    }
}

fn is_excluded(path: &Path, excluded: &[PathBuf]) -> bool {
    excluded
        .iter()
        .any(|other| other.file_name() == path.file_name() && resolved(other) == resolved(path))
}

/// `path` with its parent directory canonicalized. The file itself may not
/// exist yet.
fn resolved(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

/// Re-read one entry after the pass, for the deferred injector rewrite.
pub(crate) fn read_origin(origin: &EntryOrigin) -> Result<Vec<u8>> {
    match origin {
        EntryOrigin::Archive { archive, entry } => read_archive_entry(archive, entry)
            .map_err(|e| MergeError::input_read(archive.as_path(), e)),
        EntryOrigin::Directory { file, .. } => {
            std::fs::read(file).map_err(|e| MergeError::input_read(file.as_path(), e))
        }
    }
}

fn read_archive_entry(path: &Path, name: &str) -> std::result::Result<Vec<u8>, ZipError> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    let mut entry = archive.by_name(name)?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}
