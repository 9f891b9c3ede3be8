//! File-backed catalog store.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::{CatalogLoader, ReferenceError};
use crate::model::ConfigReference;
use crate::time::{Clock, SystemClock};

/// Catalog file extensions, in probe order.
pub const CATALOG_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Reads and decodes one catalog file, choosing the codec by extension.
///
/// Names are filled in from the map keys. The `app_name` and `last_updated`
/// fields are left as found in the file.
///
/// # Errors
///
/// Returns [`ReferenceError::Io`] if the file cannot be read (including when
/// it does not exist) and [`ReferenceError::Decode`] if it is malformed.
pub fn read_catalog(path: &Path) -> Result<ConfigReference, ReferenceError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(path, &content)
}

fn decode(path: &Path, content: &str) -> Result<ConfigReference, ReferenceError> {
    let decode_error = |reason: String| ReferenceError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let mut reference: ConfigReference = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(content).map_err(|e| decode_error(e.to_string()))?,
        _ => serde_yaml::from_str(content).map_err(|e| decode_error(e.to_string()))?,
    };
    reference.normalize();
    Ok(reference)
}

/// Serializes `value` as YAML and writes it to `path`.
///
/// Parent directories are created. The write goes to `{path}.tmp` first and
/// is renamed into place, so readers never see a partial file.
///
/// # Errors
///
/// Returns [`ReferenceError::Encode`] or [`ReferenceError::Io`].
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), ReferenceError> {
    let io_error = |path: &Path, source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = serde_yaml::to_string(value).map_err(|e| ReferenceError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
    }

    let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&temp_path, content).map_err(|e| io_error(&temp_path, e))?;
    std::fs::rename(&temp_path, path).map_err(|e| io_error(path, e))?;
    Ok(())
}

/// Loads `<dir>/<app>.<ext>` catalogs.
///
/// Extensions are probed in [`CATALOG_EXTENSIONS`] order. A missing file
/// moves on to the next extension; any other failure, including a decode
/// error, is final.
#[derive(Clone)]
pub struct FileCatalogStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCatalogStore {
    /// Creates a store over `dir` using the system clock.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    /// Creates a store that stamps loads with `clock`.
    #[must_use]
    pub fn with_clock(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    /// Returns the catalog directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a catalog for `app` is written to.
    #[must_use]
    pub fn catalog_path(&self, app: &str) -> PathBuf {
        self.dir.join(format!("{app}.yaml"))
    }
}

impl fmt::Debug for FileCatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCatalogStore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl CatalogLoader for FileCatalogStore {
    fn load_reference(&self, app: &str) -> Result<ConfigReference, ReferenceError> {
        for ext in CATALOG_EXTENSIONS {
            let path = self.dir.join(format!("{app}.{ext}"));
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => return Err(ReferenceError::Io { path, source }),
            };

            let mut reference = decode(&path, &content)?;
            reference.app_name = app.to_string();
            reference.last_updated = Some(self.clock.now_utc());
            tracing::debug!(app, path = %path.display(), settings = reference.settings.len(), "loaded catalog");
            return Ok(reference);
        }

        Err(ReferenceError::NotFound {
            app: app.to_string(),
            dir: self.dir.clone(),
        })
    }

    fn available_apps(&self) -> Result<Vec<String>, ReferenceError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ReferenceError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut apps: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| CATALOG_EXTENSIONS.contains(&e))
            })
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        apps.sort();
        apps.dedup();
        Ok(apps)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
