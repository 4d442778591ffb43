//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::recorder::CassetteRecorder;

/// Per-port `CassetteRecorder` instances writing into one directory.
///
/// Each port gets its own `<port>.cassette.yaml`, so a session directory
/// can be fed straight back into `CassetteConfig::from_dir`.
pub struct RecordingSession {
    /// Recorder for storage interactions.
    pub storage: Arc<Mutex<CassetteRecorder>>,
    /// Recorder for course table interactions.
    pub table: Arc<Mutex<CassetteRecorder>>,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a session writing into `output_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(output_dir: &Path) -> Result<Self, String> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            format!("Failed to create cassette directory {}: {e}", output_dir.display())
        })?;

        let make_recorder = |port: &str| {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            Arc::new(Mutex::new(CassetteRecorder::new(path, format!("syllabi-{port}"))))
        };

        Ok(Self {
            storage: make_recorder("storage"),
            table: make_recorder("table"),
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Finish all recorders and write cassette files to disk.
    ///
    /// Ports with no recorded interactions are not written.
    ///
    /// # Errors
    ///
    /// Returns an error if a recording adapter is still alive or a
    /// cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(arc: Arc<Mutex<CassetteRecorder>>, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(arc)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            if recorder.is_empty() {
                return Ok(());
            }
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.storage, "storage")?;
        finish_one(self.table, "table")?;

        Ok(self.output_dir)
    }
}
