//! Course table port for the hosted relational backend.

use super::PortFuture;

/// Row-oriented course table keyed by `course_code`.
///
/// Abstracting the backend allows deterministic replay and testing
/// without touching the hosted table.
pub trait CourseTable: Send + Sync {
    /// Reads one page of course codes starting at `offset`.
    ///
    /// An empty page means there are no further rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn fetch_course_codes(&self, offset: usize, limit: usize) -> PortFuture<'_, Vec<String>>;

    /// Replaces the `pdf_links` column of the row whose `course_code` equals `course_code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected.
    fn update_links<'a>(&'a self, course_code: &'a str, links: &'a [String]) -> PortFuture<'a, ()>;
}
