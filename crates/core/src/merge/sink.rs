use crate::error::{MergeError, Result};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::ZipWriter;
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;

pub(crate) type ArchiveWriter = ZipWriter<BufWriter<NamedTempFile>>;

/// Append-only output archive.
///
/// Entries go to a temporary file beside the output path which is renamed
/// over the output only by `finish`. Dropping the sink without finishing
/// removes the temporary file, so a failed pass never leaves a partial
/// archive behind.
pub(crate) struct OutputSink {
    path: PathBuf,
    temp_path: PathBuf,
    writer: ArchiveWriter,
    written: usize,
}

impl OutputSink {
    pub fn create(path: &Path) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = tempfile::Builder::new()
            .prefix(".jarweave-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| MergeError::output(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            temp_path: temp.path().to_path_buf(),
            writer: ZipWriter::new(BufWriter::new(temp)),
            written: 0,
        })
    }

    /// The output path and the temporary archive behind it. Input walks must
    /// not pick these up.
    pub fn own_paths(&self) -> [&Path; 2] {
        [&self.path, &self.temp_path]
    }

    pub fn append_with<F>(&mut self, append: F) -> Result<()>
    where
        F: FnOnce(&mut ArchiveWriter) -> ZipResult<()>,
    {
        append(&mut self.writer).map_err(|e| MergeError::output(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    pub fn write_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.append_with(|writer| {
            writer.start_file(name, SimpleFileOptions::default())?;
            writer.write_all(bytes)?;
            Ok(())
        })
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Write the central directory and move the archive into place.
    pub fn finish(self) -> Result<PathBuf> {
        let path = self.path;
        let buffered = self
            .writer
            .finish()
            .map_err(|e| MergeError::output(&path, e))?;
        let temp = buffered
            .into_inner()
            .map_err(|e| MergeError::output(&path, e.into_error()))?;
        temp.persist(&path)
            .map_err(|e| MergeError::output(&path, e.error))?;
        Ok(path)
    }
}
