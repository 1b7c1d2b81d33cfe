//! Whole-file reads and all-or-nothing writes

use std::fs;
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

use crate::{Error, Result};

/// Read an entire file into memory
///
/// I/O errors keep their kind and gain the offending path.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = fs::read(path)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
    log::debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Write `data` to `path` so that readers never observe a partial file
///
/// The bytes go to a temporary file in the destination directory, which is
/// renamed over `path` once fully flushed. On failure the temporary file is
/// removed and `path` is left as it was. Every failure is reported as
/// [`Error::Output`], never as a missing input.
///
/// A replaced file keeps its permissions. A new file gets the mode a plain
/// create would give it.
pub fn write_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let persist = || -> io::Result<()> {
        let mut temp_file = create_temp_file(dir, path)?;
        temp_file.write_all(data)?;
        temp_file.as_file().sync_all()?;

        // Atomically rename temp file to final destination
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    };
    persist().map_err(|e| Error::output(path, e))?;

    log::debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

fn create_temp_file(dir: &Path, destination: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    // Same request as File::create; the umask still applies
    #[cfg(unix)]
    builder.permissions(fs::Permissions::from_mode(0o666));

    let temp_file = builder.tempfile_in(dir)?;
    if let Ok(existing) = fs::metadata(destination) {
        temp_file.as_file().set_permissions(existing.permissions())?;
    }
    Ok(temp_file)
}

/// Whether two paths name the same existing file
pub fn same_file<P: AsRef<Path>, Q: AsRef<Path>>(a: P, b: Q) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
