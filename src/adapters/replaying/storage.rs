//! Replaying adapter for the `FileStorage` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{FileMetadata, FilePage, FileStorage, PortFuture};

/// Serves recorded storage results from a cassette.
pub struct ReplayingStorage {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingStorage {
    /// Create a replaying storage backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl FileStorage for ReplayingStorage {
    fn list_files<'a>(
        &'a self,
        _query: &'a str,
        _page_token: Option<&'a str>,
    ) -> PortFuture<'a, FilePage> {
        let output = next_output(&self.replayer, "storage", "list_files");
        Box::pin(async move { output.and_then(replay_result::<FilePage>) })
    }

    fn get_metadata<'a>(&'a self, _file_id: &'a str) -> PortFuture<'a, FileMetadata> {
        let output = next_output(&self.replayer, "storage", "get_metadata");
        Box::pin(async move { output.and_then(replay_result::<FileMetadata>) })
    }

    fn download<'a>(&'a self, _file_id: &'a str) -> PortFuture<'a, Vec<u8>> {
        let output = next_output(&self.replayer, "storage", "download");
        Box::pin(async move { output.and_then(replay_result::<Vec<u8>>) })
    }
}
