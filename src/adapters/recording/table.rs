//! Recording adapter for the `CourseTable` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{CourseTable, PortFuture};

/// Records course table interactions while delegating to an inner implementation.
pub struct RecordingTable {
    inner: Box<dyn CourseTable>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTable {
    /// Creates a new recording table wrapping the given implementation.
    pub fn new(inner: Box<dyn CourseTable>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct FetchInput {
    offset: usize,
    limit: usize,
}

#[derive(Serialize)]
struct UpdateInput<'a> {
    course_code: &'a str,
    links: &'a [String],
}

impl CourseTable for RecordingTable {
    fn fetch_course_codes(&self, offset: usize, limit: usize) -> PortFuture<'_, Vec<String>> {
        Box::pin(async move {
            let result = self.inner.fetch_course_codes(offset, limit).await;
            let input = FetchInput { offset, limit };
            record_result(&self.recorder, "table", "fetch_course_codes", &input, &result);
            result
        })
    }

    fn update_links<'a>(&'a self, course_code: &'a str, links: &'a [String]) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let result = self.inner.update_links(course_code, links).await;
            let input = UpdateInput { course_code, links };
            record_result(&self.recorder, "table", "update_links", &input, &result);
            result
        })
    }
}
