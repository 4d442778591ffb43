//! Live adapter for the `FileStorage` port using the Google Drive v3 API.

use reqwest::Client;

use super::checked_text;
use crate::ports::{FileMetadata, FilePage, FileStorage, PortError, PortFuture};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, parents, mimeType)";
const METADATA_FIELDS: &str = "name, mimeType";

/// Drive client authenticated with a bearer access token.
pub struct DriveStorage {
    client: Client,
    access_token: String,
    base_url: String,
}

impl DriveStorage {
    /// Creates a Drive client using the given OAuth access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, DRIVE_FILES_URL)
    }

    /// Creates a Drive client against a different files endpoint.
    #[must_use]
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            base_url: base_url.into(),
        }
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/{file_id}", self.base_url)
    }
}

impl FileStorage for DriveStorage {
    fn list_files<'a>(
        &'a self,
        query: &'a str,
        page_token: Option<&'a str>,
    ) -> PortFuture<'a, FilePage> {
        Box::pin(async move {
            let mut params = vec![("q", query), ("spaces", "drive"), ("fields", LIST_FIELDS)];
            if let Some(token) = page_token {
                params.push(("pageToken", token));
            }

            let response = self
                .client
                .get(&self.base_url)
                .bearer_auth(&self.access_token)
                .query(&params)
                .send()
                .await
                .map_err(|e| -> PortError { format!("Drive list request failed: {e}").into() })?;
            let text = checked_text(response, "Drive").await?;

            serde_json::from_str::<FilePage>(&text).map_err(|e| -> PortError {
                format!("Failed to parse Drive file listing: {e}").into()
            })
        })
    }

    fn get_metadata<'a>(&'a self, file_id: &'a str) -> PortFuture<'a, FileMetadata> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.file_url(file_id))
                .bearer_auth(&self.access_token)
                .query(&[("fields", METADATA_FIELDS)])
                .send()
                .await
                .map_err(|e| -> PortError {
                    format!("Drive metadata request for {file_id} failed: {e}").into()
                })?;
            let text = checked_text(response, "Drive").await?;

            serde_json::from_str::<FileMetadata>(&text).map_err(|e| -> PortError {
                format!("Failed to parse Drive metadata for {file_id}: {e}").into()
            })
        })
    }

    fn download<'a>(&'a self, file_id: &'a str) -> PortFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.file_url(file_id))
                .bearer_auth(&self.access_token)
                .query(&[("alt", "media")])
                .send()
                .await
                .map_err(|e| -> PortError {
                    format!("Drive download of {file_id} failed: {e}").into()
                })?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(format!("Drive error ({}): {text}", status.as_u16()).into());
            }
            let bytes = response.bytes().await.map_err(|e| -> PortError {
                format!("Failed to read download of {file_id}: {e}").into()
            })?;
            Ok(bytes.to_vec())
        })
    }
}
