//! Sync aggregated course links into the course table.
//!
//! Two phases: read every known course code from the table, then replace
//! the `pdf_links` of each course code that is both known and aggregated.
//! Aggregated course codes missing from the table are reported, not written.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::links::LinkMap;
use crate::ports::CourseTable;

/// Rows requested per page when reading course codes.
pub const PAGE_SIZE: usize = 1000;

/// What the sync will do (or did) for a single course code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// The row's links will be / were replaced.
    Update {
        /// The course code being written.
        course_code: String,
        /// Number of links written.
        links: usize,
    },
    /// No row exists for this course code; nothing is written.
    Unmatched {
        /// The aggregated course code.
        course_code: String,
    },
}

/// Reads every course code from the table using offset pagination.
///
/// Stops at the first empty page.
///
/// # Errors
///
/// Returns an error string if any page read fails.
pub async fn fetch_known_codes(
    table: &dyn CourseTable,
    page_size: usize,
) -> Result<HashSet<String>, String> {
    let mut known = HashSet::new();
    let mut offset = 0;
    loop {
        let page = table
            .fetch_course_codes(offset, page_size)
            .await
            .map_err(|e| format!("Failed to read course codes at offset {offset}: {e}"))?;
        if page.is_empty() {
            break;
        }
        debug!(offset, rows = page.len(), "fetched course code page");
        offset += page.len();
        known.extend(page);
    }
    info!(known = known.len(), "loaded known course codes");
    Ok(known)
}

/// Plans one action per aggregated course code, in map order.
#[must_use]
pub fn plan_sync(links: &LinkMap, known: &HashSet<String>) -> Vec<SyncAction> {
    links
        .iter()
        .map(|(code, code_links)| {
            if known.contains(code) {
                SyncAction::Update { course_code: code.clone(), links: code_links.len() }
            } else {
                SyncAction::Unmatched { course_code: code.clone() }
            }
        })
        .collect()
}

/// Executes the planned updates against the table.
///
/// Each update is independent: a failed update is logged and the remaining
/// updates still run. Returns the number of rows written.
///
/// # Errors
///
/// Returns an error string naming every course code whose update failed.
pub async fn execute_sync(
    table: &dyn CourseTable,
    links: &LinkMap,
    actions: &[SyncAction],
) -> Result<usize, String> {
    let mut written = 0;
    let mut failed = Vec::new();

    for action in actions {
        let SyncAction::Update { course_code, .. } = action else {
            continue;
        };
        let Some(code_links) = links.get(course_code) else {
            continue;
        };
        match table.update_links(course_code, code_links).await {
            Ok(()) => {
                debug!(course_code, links = code_links.len(), "updated course links");
                written += 1;
            }
            Err(e) => {
                error!(course_code, error = %e, "failed to update course links");
                failed.push(course_code.as_str());
            }
        }
    }

    if failed.is_empty() {
        Ok(written)
    } else {
        Err(format!(
            "Failed to update {} of {} course(s): {}",
            failed.len(),
            failed.len() + written,
            failed.join(", ")
        ))
    }
}

/// Formats sync actions as a human-readable report.
#[must_use]
pub fn format_actions(actions: &[SyncAction]) -> String {
    if actions.is_empty() {
        return "No course links to sync.".to_string();
    }

    actions
        .iter()
        .map(|action| match action {
            SyncAction::Update { course_code, links } => {
                format!("  UPDATE {course_code} ({links} link(s))")
            }
            SyncAction::Unmatched { course_code } => {
                format!("  UNMATCHED {course_code} (no row in table)")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
