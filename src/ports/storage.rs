//! Cloud file-storage port: paginated listing, metadata lookup, download.

use serde::{Deserialize, Serialize};

use super::PortFuture;

/// Content type of PDF documents.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Content type the storage API reports for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file as returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Parent folder identifiers, in the order the API lists them.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Content type tag, when the listing requested it.
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// One page of a file listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePage {
    /// Files on this page.
    #[serde(default)]
    pub files: Vec<FileRecord>,
    /// Opaque token for the next page; `None` on the last page.
    #[serde(default, rename = "nextPageToken", skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Name and type of a single file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Display name.
    pub name: String,
    /// Content type tag.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl FileMetadata {
    /// Returns `true` when this entry is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// Read-only access to a cloud file store.
pub trait FileStorage: Send + Sync {
    /// Lists one page of files matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    fn list_files<'a>(
        &'a self,
        query: &'a str,
        page_token: Option<&'a str>,
    ) -> PortFuture<'a, FilePage>;

    /// Fetches the name and type of a single file or folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist or cannot be read.
    fn get_metadata<'a>(&'a self, file_id: &'a str) -> PortFuture<'a, FileMetadata>;

    /// Downloads the raw contents of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    fn download<'a>(&'a self, file_id: &'a str) -> PortFuture<'a, Vec<u8>>;
}
