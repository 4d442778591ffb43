//! Live adapters for real external interactions.

pub mod drive;
pub mod filesystem;
pub mod supabase;

pub use drive::DriveStorage;
pub use filesystem::LiveFileSystem;
pub use supabase::SupabaseTable;

use crate::ports::PortError;

/// Reads a response body and turns non-success statuses into errors.
///
/// `service` names the remote API in error messages.
pub(crate) async fn checked_text(
    response: reqwest::Response,
    service: &str,
) -> Result<String, PortError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| -> PortError { format!("Failed to read {service} response: {e}").into() })?;
    if !status.is_success() {
        return Err(format!("{service} error ({}): {text}", status.as_u16()).into());
    }
    Ok(text)
}
