//! Files that live only as long as a scope
//!
//! Manifests are often written to disk just long enough for another tool
//! (kubectl, a validator) to read them. [`ScopedFile`] owns such a file and
//! removes it when dropped, including on early returns and panics.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::paths::expand_tilde;

/// A generated file deleted when the guard is dropped
#[derive(Debug)]
pub struct ScopedFile {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl ScopedFile {
    /// Write `contents` to `<folder>/<prefix>-<uuid4>.yml`
    ///
    /// The file is created exclusively; an existing file with the same name
    /// is never overwritten.
    pub fn create<P: AsRef<Path>>(folder: P, prefix: &str, contents: &str) -> Result<Self> {
        let folder = expand_tilde(folder);
        let name = format!("{}-{}", prefix, Uuid::new_v4());
        let mut file = tempfile::Builder::new()
            .prefix(&name)
            .suffix(".yml")
            .rand_bytes(0)
            .tempfile_in(&folder)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        let temp = file.into_temp_path();
        let path = temp.to_path_buf();
        tracing::debug!(path = %path.display(), bytes = contents.len(), "created scoped file");

        Ok(Self {
            path,
            temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disarm the guard and hand the file over to the caller
    pub fn keep(mut self) -> Result<PathBuf> {
        match self.temp.take() {
            Some(temp) => temp.keep().map_err(|e| CoreError::Io(e.error)),
            None => Ok(std::mem::take(&mut self.path)),
        }
    }
}

impl AsRef<Path> for ScopedFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };

        match temp.close() {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed scoped file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove scoped file"
            ),
        }
    }
}

/// Write a scoped file, run `f` with its path, then delete the file
///
/// The file is removed whether `f` returns `Ok`, `Err` or panics.
pub fn with_scoped_file<P, F, R, E>(
    folder: P,
    prefix: &str,
    contents: &str,
    f: F,
) -> std::result::Result<R, E>
where
    P: AsRef<Path>,
    F: FnOnce(&Path) -> std::result::Result<R, E>,
    E: From<CoreError>,
{
    let file = ScopedFile::create(folder, prefix, contents)?;
    f(file.path())
}
