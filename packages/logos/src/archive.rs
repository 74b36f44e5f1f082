//! Zip extraction for the downloaded logo repository.

use std::io::Cursor;
use std::path::Path;

use crate::LogoError;

/// Extracts an in-memory zip archive into `dest_dir`.
///
/// The target directory is created if it does not exist. Existing contents
/// are **not** removed; the archive is extracted on top, so a previous
/// run's files are overwritten where the archive has them.
///
/// Returns the number of entries in the archive.
///
/// # Errors
///
/// Returns [`LogoError::Archive`] if the bytes are not a readable zip
/// archive or an entry cannot be extracted, and [`LogoError::Io`] if the
/// directory cannot be created.
pub fn extract_zip(bytes: &[u8], dest_dir: &Path) -> Result<usize, LogoError> {
    log::info!("Extracting archive -> {}", dest_dir.display());

    std::fs::create_dir_all(dest_dir).map_err(|e| LogoError::Io {
        path: dest_dir.display().to_string(),
        source: e,
    })?;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| LogoError::Archive(format!("failed to open zip archive: {e}")))?;

    let count = archive.len();

    archive
        .extract(dest_dir)
        .map_err(|e| LogoError::Archive(format!("failed to extract zip archive: {e}")))?;

    log::info!("  extracted {count} entries");

    Ok(count)
}
