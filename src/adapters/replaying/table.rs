//! Replaying adapter for the `CourseTable` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{CourseTable, PortFuture};

/// Serves recorded course table results from a cassette.
pub struct ReplayingTable {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTable {
    /// Create a replaying course table backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl CourseTable for ReplayingTable {
    fn fetch_course_codes(&self, _offset: usize, _limit: usize) -> PortFuture<'_, Vec<String>> {
        let output = next_output(&self.replayer, "table", "fetch_course_codes");
        Box::pin(async move { output.and_then(replay_result::<Vec<String>>) })
    }

    fn update_links<'a>(
        &'a self,
        _course_code: &'a str,
        _links: &'a [String],
    ) -> PortFuture<'a, ()> {
        let output = next_output(&self.replayer, "table", "update_links");
        Box::pin(async move { output.and_then(replay_result::<()>) })
    }
}
