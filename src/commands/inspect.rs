//! `syllabi inspect` command.

use crate::context::ServiceContext;
use crate::inspect::inspect_folder;

/// Execute the `inspect` command, printing to stdout.
///
/// # Errors
///
/// Returns an error string if the folder cannot be listed.
pub async fn run_with_context(ctx: &ServiceContext, folder_id: &str) -> Result<(), String> {
    let mut stdout = std::io::stdout();
    let summary = inspect_folder(ctx.storage.as_ref(), folder_id, &mut stdout).await?;
    tracing::info!(
        printed = summary.printed,
        skipped = summary.skipped,
        failed = summary.failed,
        "inspected folder"
    );
    Ok(())
}
