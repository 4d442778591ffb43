//! `syllabi links` command.

use std::path::Path;

use crate::context::ServiceContext;
use crate::links::{aggregate, LinkMap, LinkStore};

/// Execute the `links` command: aggregate, print, and save the handoff file.
///
/// # Errors
///
/// Returns an error string if the listing fails or the file cannot be written.
pub async fn run_with_context(ctx: &ServiceContext, output: &Path) -> Result<(), String> {
    let links = aggregate(ctx.storage.as_ref()).await?;

    println!("{}", format_links(&links));

    LinkStore::new(ctx.fs.as_ref(), output).save(&links)?;
    println!("Saved {} course code(s) to {}", links.len(), output.display());
    Ok(())
}

/// Formats the aggregated links for the terminal.
#[must_use]
pub fn format_links(links: &LinkMap) -> String {
    if links.is_empty() {
        return "No PDF files found in your drive.".to_string();
    }

    let mut lines =
        vec!["PDF files grouped by course code, with their shareable links:".to_string()];
    for (course_code, code_links) in links {
        lines.push(String::new());
        lines.push(format!("course_code: {course_code}"));
        lines.extend(code_links.iter().map(|link| format!("  pdf_link: {link}")));
    }
    lines.join("\n")
}
