//! Link store: the JSON handoff between `links` and `sync`.
//!
//! The file is a pretty-printed JSON object mapping each course code to its
//! list of links:
//!
//! ```text
//! {
//!   "CS101": [
//!     "https://drive.google.com/file/d/1/preview"
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use super::aggregate::LinkMap;
use crate::ports::FileSystem;

/// Default handoff file name.
pub const DEFAULT_LINKS_FILE: &str = "course_links.json";

/// Reads and writes the handoff file through the `FileSystem` port.
pub struct LinkStore<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> LinkStore<'a> {
    /// Creates a store for the handoff file at `path`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, path: &Path) -> Self {
        Self { fs, path: path.to_path_buf() }
    }

    /// Writes the link map as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self, links: &LinkMap) -> Result<(), String> {
        let json = serde_json::to_string_pretty(links)
            .map_err(|e| format!("Failed to serialize course links: {e}"))?;
        self.fs
            .write(&self.path, &json)
            .map_err(|e| format!("Failed to write {}: {e}", self.path.display()))
    }

    /// Loads a link map previously written by [`LinkStore::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not a
    /// course code → links object.
    pub fn load(&self) -> Result<LinkMap, String> {
        if !self.fs.exists(&self.path) {
            return Err(format!(
                "Links file {} not found. Run `syllabi links` first.",
                self.path.display()
            ));
        }
        let contents = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| format!("Failed to read {}: {e}", self.path.display()))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse {}: {e}", self.path.display()))
    }
}
