//! `syllabi sync` command.

use std::path::Path;

use crate::context::ServiceContext;
use crate::links::LinkStore;
use crate::sync::{
    execute_sync, fetch_known_codes, format_actions, plan_sync, SyncAction, PAGE_SIZE,
};

/// Execute the `sync` command.
///
/// # Errors
///
/// Returns an error string if the handoff file cannot be loaded, the table
/// cannot be read, or any update fails.
pub async fn run_with_context(
    ctx: &ServiceContext,
    input: &Path,
    dry_run: bool,
) -> Result<(), String> {
    let links = LinkStore::new(ctx.fs.as_ref(), input).load()?;
    if links.is_empty() {
        println!("No course links to sync.");
        return Ok(());
    }

    let known = fetch_known_codes(ctx.table.as_ref(), PAGE_SIZE).await?;
    let actions = plan_sync(&links, &known);

    if dry_run {
        println!("Dry run, would perform:");
        println!("{}", format_actions(&actions));
        return Ok(());
    }

    let result = execute_sync(ctx.table.as_ref(), &links, &actions).await;
    println!("{}", format_actions(&actions));

    let unmatched = actions.iter().filter(|a| matches!(a, SyncAction::Unmatched { .. })).count();
    let written = result?;
    println!("Sync complete: {written} course(s) updated, {unmatched} unmatched.");
    Ok(())
}
