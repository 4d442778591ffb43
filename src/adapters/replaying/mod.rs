//! Replaying adapters that serve recorded interactions.

pub mod storage;
pub mod table;

pub use storage::ReplayingStorage;
pub use table::ReplayingTable;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::PortError;

/// Pull the next recorded output for `port::method`.
///
/// A cassette with nothing left for the call surfaces as a port error.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, PortError> {
    let mut guard = match replayer.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let interaction = guard.next_interaction(port, method)?;
    Ok(interaction.output.clone())
}

/// Decode a recorded `{"Ok": v}` / `{"Err": "msg"}` output.
///
/// Mirror of `recording::record_result`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, PortError> {
    if let Some(err) = output.get("Err") {
        return Err(err.as_str().unwrap_or("unknown error").to_string().into());
    }
    let value = output.get("Ok").cloned().unwrap_or(output);
    serde_json::from_value(value)
        .map_err(|e| format!("Recorded output does not match expected type: {e}").into())
}
