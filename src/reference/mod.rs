//! The curated settings catalogs and everything built on them.
//!
//! This module provides:
//! - Loading catalogs from a directory ([`CatalogLoader`], [`FileCatalogStore`])
//! - Cached lookup, value validation and search ([`ReferenceManager`])
//! - Translation into the editable application model ([`ConfigMapper`])

mod error;
mod manager;
mod mapper;
mod store;

pub use error::{MappingError, ReferenceError};
pub use manager::ReferenceManager;
pub use mapper::{ConfigMapper, field_for, merge_extracted};
pub use store::{CATALOG_EXTENSIONS, FileCatalogStore, read_catalog, write_yaml};

use crate::model::ConfigReference;

/// Source of reference catalogs.
///
/// Loading is synchronous: catalogs are small local files and are cached by
/// [`ReferenceManager`] after the first load.
pub trait CatalogLoader: Send + Sync {
    /// Loads the catalog for `app`.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::NotFound`] if no catalog exists, or a
    /// decode/I/O error if one exists but cannot be read.
    fn load_reference(&self, app: &str) -> Result<ConfigReference, ReferenceError>;

    /// Lists the applications that have a catalog, sorted.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the catalog location cannot be listed.
    fn available_apps(&self) -> Result<Vec<String>, ReferenceError>;
}
