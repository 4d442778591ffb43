//! Link aggregation over a paginated PDF listing.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::resolve::FolderResolver;
use crate::ports::{FileStorage, PDF_MIME_TYPE};

/// Course code → shareable links, in discovery order within each code.
pub type LinkMap = BTreeMap<String, Vec<String>>;

/// Builds the preview link for a file.
#[must_use]
pub fn share_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{file_id}/preview")
}

/// Storage query selecting every PDF.
#[must_use]
pub fn pdf_query() -> String {
    format!("mimeType='{PDF_MIME_TYPE}'")
}

/// Walks every page of PDFs and groups their links by course code.
///
/// Every listed file contributes exactly one link. A failed folder lookup
/// only degrades the course code; a failed page request aborts the walk.
///
/// # Errors
///
/// Returns an error string if a listing page cannot be fetched.
pub async fn aggregate(storage: &dyn FileStorage) -> Result<LinkMap, String> {
    let query = pdf_query();
    let mut resolver = FolderResolver::new(storage);
    let mut links = LinkMap::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;
    let mut files = 0usize;

    loop {
        let page = storage
            .list_files(&query, page_token.as_deref())
            .await
            .map_err(|e| format!("Failed to list PDF files (page {}): {e}", pages + 1))?;
        pages += 1;
        debug!(page = pages, files = page.files.len(), "fetched listing page");

        for file in page.files {
            let parent = file.parents.first().map(String::as_str);
            let course_code = resolver.resolve(parent, &file.name).await;
            links.entry(course_code).or_default().push(share_link(&file.id));
            files += 1;
        }

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    info!(
        files,
        pages,
        course_codes = links.len(),
        folder_lookups = resolver.lookups(),
        "aggregated PDF links"
    );
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FilePage, FileRecord};
    use crate::testing::FakeStorage;

    fn pdf(id: &str, name: &str, parent: Option<&str>) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            parents: parent.into_iter().map(String::from).collect(),
            mime_type: None,
        }
    }

    #[test]
    fn share_link_uses_preview_template() {
        assert_eq!(share_link("abc"), "https://drive.google.com/file/d/abc/preview");
    }

    #[test]
    fn pdf_query_filters_on_mime_type() {
        assert_eq!(pdf_query(), "mimeType='application/pdf'");
    }

    #[tokio::test]
    async fn groups_links_by_folder_name() {
        let storage = FakeStorage::new().with_folder("F1", "CS101").with_pages(vec![FilePage {
            files: vec![
                pdf("1", "A.pdf", Some("F1")),
                pdf("2", "B.pdf", Some("F1")),
                pdf("3", "C.pdf", None),
            ],
            next_page_token: None,
        }]);

        let links = aggregate(&storage).await.unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links["CS101"], vec![share_link("1"), share_link("2")]);
        assert_eq!(links["C.pdf"], vec![share_link("3")]);
        assert_eq!(storage.metadata_calls_for("F1"), 1);
    }

    #[tokio::test]
    async fn follows_page_tokens_and_keeps_discovery_order() {
        let storage = FakeStorage::new().with_folder("F1", "MATH:1850").with_pages(vec![
            FilePage {
                files: vec![pdf("a", "week1.pdf", Some("F1"))],
                next_page_token: Some("p2".to_string()),
            },
            FilePage {
                files: vec![pdf("b", "week2.pdf", Some("F1"))],
                next_page_token: Some("p3".to_string()),
            },
            FilePage { files: vec![pdf("c", "week3.pdf", Some("F1"))], next_page_token: None },
        ]);

        let links = aggregate(&storage).await.unwrap();

        assert_eq!(
            links["MATH:1850"],
            vec![share_link("a"), share_link("b"), share_link("c")]
        );
        assert_eq!(storage.page_tokens_seen(), vec![None, Some("p2".into()), Some("p3".into())]);
    }

    #[tokio::test]
    async fn only_first_parent_is_used() {
        let storage = FakeStorage::new()
            .with_folder("F1", "CS101")
            .with_folder("F2", "CS102")
            .with_pages(vec![FilePage {
                files: vec![FileRecord {
                    id: "1".into(),
                    name: "A.pdf".into(),
                    parents: vec!["F2".into(), "F1".into()],
                    mime_type: None,
                }],
                next_page_token: None,
            }]);

        let links = aggregate(&storage).await.unwrap();

        assert_eq!(links.keys().collect::<Vec<_>>(), vec!["CS102"]);
        assert_eq!(storage.metadata_calls_for("F1"), 0);
    }

    #[tokio::test]
    async fn duplicate_files_are_not_deduplicated() {
        let storage = FakeStorage::new().with_folder("F1", "CS101").with_pages(vec![FilePage {
            files: vec![pdf("1", "A.pdf", Some("F1")), pdf("1", "A.pdf", Some("F1"))],
            next_page_token: None,
        }]);

        let links = aggregate(&storage).await.unwrap();

        assert_eq!(links["CS101"].len(), 2);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_the_file() {
        let storage = FakeStorage::new().with_pages(vec![FilePage {
            files: vec![pdf("1", "Orphan.pdf", Some("gone"))],
            next_page_token: None,
        }]);

        let links = aggregate(&storage).await.unwrap();

        assert_eq!(links["Orphan.pdf"], vec![share_link("1")]);
    }

    #[tokio::test]
    async fn listing_failure_is_fatal() {
        let storage = FakeStorage::new().failing_listing("quota exceeded");

        let err = aggregate(&storage).await.unwrap_err();

        assert!(err.contains("Failed to list PDF files"));
        assert!(err.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn empty_drive_yields_empty_map() {
        let storage = FakeStorage::new();
        let links = aggregate(&storage).await.unwrap();
        assert!(links.is_empty());
    }
}
