//! Download the PDFs in one folder and print their text.

use std::io::Write;

use lopdf::Document;
use tracing::warn;

use crate::ports::{FileRecord, FileStorage, PDF_MIME_TYPE};

/// Counts reported after inspecting a folder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InspectSummary {
    /// PDFs whose text was printed.
    pub printed: usize,
    /// Files that are not PDFs.
    pub skipped: usize,
    /// PDFs that could not be downloaded or parsed.
    pub failed: usize,
}

/// Storage query selecting the direct children of a folder.
#[must_use]
pub fn folder_query(folder_id: &str) -> String {
    format!("'{}' in parents", folder_id.replace('\'', "\\'"))
}

/// Extracts the text of every page, in page order. Pages without text are omitted.
///
/// # Errors
///
/// Returns an error if the bytes are not a readable PDF.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<Vec<String>, String> {
    let document = Document::load_mem(bytes).map_err(|e| format!("Failed to parse PDF: {e}"))?;
    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text),
            Ok(_) => {}
            Err(e) => warn!(page = page_number, error = %e, "failed to extract page text"),
        }
    }
    Ok(pages)
}

/// Lists `folder_id`, printing the text of each PDF to `out`.
///
/// A file that fails to download or parse is reported and skipped.
///
/// # Errors
///
/// Returns an error if the folder listing fails or `out` cannot be written.
pub async fn inspect_folder(
    storage: &dyn FileStorage,
    folder_id: &str,
    out: &mut dyn Write,
) -> Result<InspectSummary, String> {
    let files = list_folder(storage, folder_id).await?;
    let mut summary = InspectSummary::default();

    if files.is_empty() {
        writeln!(out, "No files found in the folder.").map_err(write_error)?;
        return Ok(summary);
    }

    for file in &files {
        let mime_type = file.mime_type.as_deref().unwrap_or("unknown");
        writeln!(out, "Found file: {} (ID: {}) - {mime_type}", file.name, file.id)
            .map_err(write_error)?;

        if mime_type != PDF_MIME_TYPE {
            writeln!(out, "Skipping {}: Not a PDF file.\n", file.name).map_err(write_error)?;
            summary.skipped += 1;
            continue;
        }

        let pages = match download_text(storage, file).await {
            Ok(pages) => pages,
            Err(e) => {
                writeln!(out, "Error processing {}: {e}\n", file.name).map_err(write_error)?;
                summary.failed += 1;
                continue;
            }
        };

        writeln!(out, "\n--- Content of {} ---", file.name).map_err(write_error)?;
        for text in &pages {
            writeln!(out, "{}", text.trim_end()).map_err(write_error)?;
        }
        writeln!(out, "--- End of {} ---\n", file.name).map_err(write_error)?;
        summary.printed += 1;
    }

    Ok(summary)
}

async fn list_folder(
    storage: &dyn FileStorage,
    folder_id: &str,
) -> Result<Vec<FileRecord>, String> {
    let query = folder_query(folder_id);
    let mut files = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = storage
            .list_files(&query, page_token.as_deref())
            .await
            .map_err(|e| format!("Failed to list folder {folder_id}: {e}"))?;
        files.extend(page.files);
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(files),
        }
    }
}

async fn download_text(
    storage: &dyn FileStorage,
    file: &FileRecord,
) -> Result<Vec<String>, String> {
    let bytes = storage.download(&file.id).await.map_err(|e| e.to_string())?;
    extract_pdf_text(&bytes)
}

fn write_error(e: std::io::Error) -> String {
    format!("Failed to write output: {e}")
}
