//! Service context bundling all port trait objects.

use std::sync::Arc;

use crate::adapters::live::{DriveStorage, LiveFileSystem, SupabaseTable};
use crate::adapters::recording::{RecordingStorage, RecordingTable};
use crate::adapters::replaying::{ReplayingStorage, ReplayingTable};
use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::config::BackendConfig;
use crate::ports::{
    CourseTable, FileMetadata, FilePage, FileStorage, FileSystem, PortError, PortFuture,
};

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up different adapter implementations (live,
/// replaying, recording). Ports a command does not need are left
/// unconfigured and fail with a descriptive error when called.
pub struct ServiceContext {
    /// Cloud file storage.
    pub storage: Box<dyn FileStorage>,
    /// Course table backend.
    pub table: Box<dyn CourseTable>,
    /// Local filesystem for the handoff and token files.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(
        storage: Box<dyn FileStorage>,
        table: Box<dyn CourseTable>,
        fs: Box<dyn FileSystem>,
    ) -> Self {
        Self { storage, table, fs }
    }

    /// Creates a live context.
    ///
    /// Storage is available when an access token is supplied and the table
    /// when backend settings are supplied.
    #[must_use]
    pub fn live(access_token: Option<String>, backend: Option<&BackendConfig>) -> Self {
        let storage: Box<dyn FileStorage> = match access_token {
            Some(token) => Box::new(DriveStorage::new(token)),
            None => Box::new(Unconfigured("storage is not used by this command")),
        };
        let table: Box<dyn CourseTable> = match backend {
            Some(b) => Box::new(SupabaseTable::new(&b.url, &b.key, &b.table)),
            None => Box::new(Unconfigured("the course table is not used by this command")),
        };
        Self::new(storage, table, Box::new(LiveFileSystem))
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// The filesystem stays live. Ports without a configured cassette fail
    /// with a "not configured in CassetteConfig" error when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;
        let storage: Box<dyn FileStorage> = match replayers.storage {
            Some(r) => Box::new(ReplayingStorage::new(r)),
            None => Box::new(Unconfigured("storage not configured in CassetteConfig")),
        };
        let table: Box<dyn CourseTable> = match replayers.table {
            Some(r) => Box::new(ReplayingTable::new(r)),
            None => Box::new(Unconfigured("table not configured in CassetteConfig")),
        };
        Ok(Self::new(storage, table, Box::new(LiveFileSystem)))
    }

    /// Wraps the storage and table ports so every interaction is recorded
    /// into `session`.
    #[must_use]
    pub fn recording(self, session: &RecordingSession) -> Self {
        Self {
            storage: Box::new(RecordingStorage::new(self.storage, Arc::clone(&session.storage))),
            table: Box::new(RecordingTable::new(self.table, Arc::clone(&session.table))),
            fs: self.fs,
        }
    }
}

/// Stand-in for a port the current context cannot serve.
struct Unconfigured(&'static str);

impl Unconfigured {
    fn fail<'a, T: Send + 'a>(&self) -> PortFuture<'a, T> {
        let message = self.0;
        Box::pin(async move { Err::<T, PortError>(message.into()) })
    }
}

impl FileStorage for Unconfigured {
    fn list_files<'a>(
        &'a self,
        _query: &'a str,
        _page_token: Option<&'a str>,
    ) -> PortFuture<'a, FilePage> {
        self.fail()
    }

    fn get_metadata<'a>(&'a self, _file_id: &'a str) -> PortFuture<'a, FileMetadata> {
        self.fail()
    }

    fn download<'a>(&'a self, _file_id: &'a str) -> PortFuture<'a, Vec<u8>> {
        self.fail()
    }
}

impl CourseTable for Unconfigured {
    fn fetch_course_codes(&self, _offset: usize, _limit: usize) -> PortFuture<'_, Vec<String>> {
        self.fail()
    }

    fn update_links<'a>(
        &'a self,
        _course_code: &'a str,
        _links: &'a [String],
    ) -> PortFuture<'a, ()> {
        self.fail()
    }
}
