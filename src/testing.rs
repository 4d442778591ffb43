//! In-memory port fakes shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::ports::{
    CourseTable, FileMetadata, FilePage, FileStorage, FileSystem, PortError, PortFuture,
    FOLDER_MIME_TYPE,
};

/// Scripted file store that counts the calls made against it.
#[derive(Default)]
pub struct FakeStorage {
    entries: HashMap<String, FileMetadata>,
    contents: HashMap<String, Vec<u8>>,
    pages: Mutex<VecDeque<FilePage>>,
    listing_error: Option<String>,
    metadata_calls: Mutex<Vec<String>>,
    page_tokens: Mutex<Vec<Option<String>>>,
    queries: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(self, id: &str, name: &str) -> Self {
        self.with_entry(id, name, FOLDER_MIME_TYPE)
    }

    pub fn with_entry(mut self, id: &str, name: &str, mime_type: &str) -> Self {
        self.entries.insert(
            id.to_string(),
            FileMetadata { name: name.to_string(), mime_type: mime_type.to_string() },
        );
        self
    }

    pub fn with_content(mut self, id: &str, bytes: Vec<u8>) -> Self {
        self.contents.insert(id.to_string(), bytes);
        self
    }

    pub fn with_pages(self, pages: Vec<FilePage>) -> Self {
        *self.pages.lock().unwrap() = pages.into();
        self
    }

    pub fn failing_listing(mut self, message: &str) -> Self {
        self.listing_error = Some(message.to_string());
        self
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.lock().unwrap().len()
    }

    pub fn metadata_calls_for(&self, id: &str) -> usize {
        self.metadata_calls.lock().unwrap().iter().filter(|c| *c == id).count()
    }

    pub fn page_tokens_seen(&self) -> Vec<Option<String>> {
        self.page_tokens.lock().unwrap().clone()
    }

    pub fn queries_seen(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl FileStorage for FakeStorage {
    fn list_files<'a>(
        &'a self,
        query: &'a str,
        page_token: Option<&'a str>,
    ) -> PortFuture<'a, FilePage> {
        self.queries.lock().unwrap().push(query.to_string());
        self.page_tokens.lock().unwrap().push(page_token.map(String::from));
        let result: Result<FilePage, PortError> = match &self.listing_error {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default()),
        };
        Box::pin(async move { result })
    }

    fn get_metadata<'a>(&'a self, file_id: &'a str) -> PortFuture<'a, FileMetadata> {
        self.metadata_calls.lock().unwrap().push(file_id.to_string());
        let result: Result<FileMetadata, PortError> = self
            .entries
            .get(file_id)
            .cloned()
            .ok_or_else(|| format!("File not found: {file_id}").into());
        Box::pin(async move { result })
    }

    fn download<'a>(&'a self, file_id: &'a str) -> PortFuture<'a, Vec<u8>> {
        let result: Result<Vec<u8>, PortError> = self
            .contents
            .get(file_id)
            .cloned()
            .ok_or_else(|| format!("No content for {file_id}").into());
        Box::pin(async move { result })
    }
}

/// Course table backed by a fixed list of codes that records every update.
#[derive(Default)]
pub struct FakeTable {
    codes: Vec<String>,
    failing_updates: Vec<String>,
    reads: Mutex<Vec<(usize, usize)>>,
    updates: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeTable {
    pub fn with_codes(codes: &[&str]) -> Self {
        Self { codes: codes.iter().map(|c| (*c).to_string()).collect(), ..Self::default() }
    }

    pub fn failing_update(mut self, code: &str) -> Self {
        self.failing_updates.push(code.to_string());
        self
    }

    pub fn reads(&self) -> Vec<(usize, usize)> {
        self.reads.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, Vec<String>)> {
        self.updates.lock().unwrap().clone()
    }
}

impl CourseTable for FakeTable {
    fn fetch_course_codes(&self, offset: usize, limit: usize) -> PortFuture<'_, Vec<String>> {
        self.reads.lock().unwrap().push((offset, limit));
        let page: Vec<String> = self.codes.iter().skip(offset).take(limit).cloned().collect();
        Box::pin(async move { Ok::<_, PortError>(page) })
    }

    fn update_links<'a>(&'a self, course_code: &'a str, links: &'a [String]) -> PortFuture<'a, ()> {
        self.updates.lock().unwrap().push((course_code.to_string(), links.to_vec()));
        let rejected = self.failing_updates.iter().any(|c| c == course_code);
        let result: Result<(), PortError> = if rejected {
            Err(format!("update rejected for {course_code}").into())
        } else {
            Ok(())
        };
        Box::pin(async move { result })
    }
}

/// In-memory filesystem for testing without touching disk.
#[derive(Default)]
pub struct MemFs {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.files.lock().unwrap().insert(PathBuf::from(path), contents.to_string());
        self
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl FileSystem for MemFs {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}
