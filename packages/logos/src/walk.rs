//! Directory traversal for the extracted `countries/` tree.
//!
//! Each directory directly under `countries/` is a country. Logo files may
//! sit at any depth below it. Traversal never descends into a symbolic
//! link, so link cycles cannot loop; a link that points at a regular file
//! still counts as a file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::{ALLOWED_EXTENSIONS, LogoError};

/// A country directory under `countries/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    /// Directory name, used as the group key.
    pub name: String,
    /// Full path to the directory.
    pub path: PathBuf,
}

fn io_error(path: &Path, source: std::io::Error) -> LogoError {
    LogoError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Lists the country directories in `countries_dir`, sorted by name
/// case-insensitively.
///
/// Plain files and symbolic links at this level are ignored.
///
/// # Errors
///
/// Returns [`LogoError::Io`] if the directory cannot be read.
pub fn country_dirs(countries_dir: &Path) -> Result<Vec<Country>, LogoError> {
    let entries = std::fs::read_dir(countries_dir).map_err(|e| io_error(countries_dir, e))?;

    let mut countries = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error(countries_dir, e))?;
        let file_type = entry.file_type().map_err(|e| io_error(&entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }

        countries.push(Country {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }

    countries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(countries)
}

/// Whether `path` has an allowed image extension (case-insensitive).
#[must_use]
pub fn is_allowed_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Lazy depth-first iterator over the image files below a directory.
///
/// Yields paths relative to the root, joined with `/` on every platform.
/// Entries within a directory are visited in file-name order.
pub struct LogoFiles {
    root: PathBuf,
    stack: Vec<std::vec::IntoIter<PathBuf>>,
}

impl LogoFiles {
    /// Creates a walk rooted at `root`. Nothing is read until the first
    /// call to `next`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            stack: vec![vec![root.to_path_buf()].into_iter()],
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn read_sorted(dir: &Path) -> Result<Vec<PathBuf>, LogoError> {
        let mut children = std::fs::read_dir(dir)
            .map_err(|e| io_error(dir, e))?
            .map(|entry| entry.map(|e| e.path()).map_err(|e| io_error(dir, e)))
            .collect::<Result<Vec<_>, _>>()?;
        children.sort();
        Ok(children)
    }

    /// Classifies one path: pushes directories, returns matching files.
    fn visit(&mut self, path: PathBuf) -> Result<Option<String>, LogoError> {
        let meta = std::fs::symlink_metadata(&path).map_err(|e| io_error(&path, e))?;
        let file_type = meta.file_type();

        if file_type.is_dir() {
            let children = Self::read_sorted(&path)?;
            self.stack.push(children.into_iter());
            return Ok(None);
        }

        let is_file = if file_type.is_symlink() {
            // Dangling links are skipped rather than failing the walk.
            std::fs::metadata(&path).is_ok_and(|m| m.is_file())
        } else {
            file_type.is_file()
        };

        if is_file && is_allowed_image(&path) {
            return Ok(Some(self.relative(&path)));
        }

        Ok(None)
    }
}

impl Iterator for LogoFiles {
    type Item = Result<String, LogoError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let Some(path) = top.next() else {
                self.stack.pop();
                continue;
            };

            match self.visit(path) {
                Ok(Some(rel)) => return Some(Ok(rel)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
