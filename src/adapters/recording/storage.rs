//! Recording adapter for the `FileStorage` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{FileMetadata, FilePage, FileStorage, PortFuture};

/// Records storage interactions while delegating to an inner implementation.
pub struct RecordingStorage {
    inner: Box<dyn FileStorage>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingStorage {
    /// Creates a new recording storage wrapping the given implementation.
    pub fn new(inner: Box<dyn FileStorage>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct ListFilesInput<'a> {
    query: &'a str,
    page_token: Option<&'a str>,
}

#[derive(Serialize)]
struct FileIdInput<'a> {
    file_id: &'a str,
}

impl FileStorage for RecordingStorage {
    fn list_files<'a>(
        &'a self,
        query: &'a str,
        page_token: Option<&'a str>,
    ) -> PortFuture<'a, FilePage> {
        Box::pin(async move {
            let result = self.inner.list_files(query, page_token).await;
            let input = ListFilesInput { query, page_token };
            record_result(&self.recorder, "storage", "list_files", &input, &result);
            result
        })
    }

    fn get_metadata<'a>(&'a self, file_id: &'a str) -> PortFuture<'a, FileMetadata> {
        Box::pin(async move {
            let result = self.inner.get_metadata(file_id).await;
            let input = FileIdInput { file_id };
            record_result(&self.recorder, "storage", "get_metadata", &input, &result);
            result
        })
    }

    fn download<'a>(&'a self, file_id: &'a str) -> PortFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let result = self.inner.download(file_id).await;
            record_result(&self.recorder, "storage", "download", &FileIdInput { file_id }, &result);
            result
        })
    }
}
