//! Folder resolution: parent folder id → course code.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::ports::FileStorage;

/// Resolves a file's parent folder into a course code, memoizing per parent.
///
/// The cache lives for one run. Every parent id is looked up at most once,
/// including lookups that failed or returned something other than a folder.
pub struct FolderResolver<'a> {
    storage: &'a dyn FileStorage,
    cache: HashMap<String, String>,
    lookups: usize,
}

impl<'a> FolderResolver<'a> {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new(storage: &'a dyn FileStorage) -> Self {
        Self { storage, cache: HashMap::new(), lookups: 0 }
    }

    /// Returns the course code for a file.
    ///
    /// `fallback` (normally the file's own name) is used when the file has
    /// no parent, the parent is not a folder, or the lookup fails. Lookup
    /// failures are logged and never propagate.
    pub async fn resolve(&mut self, parent_id: Option<&str>, fallback: &str) -> String {
        let Some(parent_id) = parent_id else {
            return fallback.to_string();
        };

        if let Some(label) = self.cache.get(parent_id) {
            return label.clone();
        }

        self.lookups += 1;
        let label = match self.storage.get_metadata(parent_id).await {
            Ok(meta) if meta.is_folder() => meta.name,
            Ok(meta) => {
                debug!(parent_id, mime_type = %meta.mime_type, "parent is not a folder");
                fallback.to_string()
            }
            Err(e) => {
                warn!(parent_id, error = %e, "failed to retrieve folder info");
                fallback.to_string()
            }
        };

        self.cache.insert(parent_id.to_string(), label.clone());
        label
    }

    /// Number of metadata lookups issued so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}
