//! Runtime configuration read from the environment.
//!
//! `main` loads a `.env` file first, so every value can also live there.

use std::env;
use std::path::PathBuf;

/// Default course table name.
pub const DEFAULT_TABLE: &str = "courses";

/// Settings shared by all commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Project URL of the hosted table backend (`SUPABASE_URL`).
    pub supabase_url: Option<String>,
    /// API key for the table backend (`SUPABASE_KEY`).
    pub supabase_key: Option<String>,
    /// Table holding `course_code` and `pdf_links` (`SYLLABI_TABLE`).
    pub table: String,
    /// OAuth client secrets file (`SYLLABI_CREDENTIALS`).
    pub credentials_path: PathBuf,
    /// Persisted token file (`SYLLABI_TOKEN`).
    pub token_path: PathBuf,
    /// Directory to record port cassettes into (`SYLLABI_RECORD`).
    pub record_dir: Option<PathBuf>,
    /// Directory of cassettes to serve instead of the live services (`SYLLABI_REPLAY`).
    pub replay_dir: Option<PathBuf>,
}

/// Connection settings for the table backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project URL.
    pub url: String,
    /// API key.
    pub key: String,
    /// Table name.
    pub table: String,
}

impl Config {
    /// Reads the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            supabase_url: get("SUPABASE_URL"),
            supabase_key: get("SUPABASE_KEY"),
            table: get("SYLLABI_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            credentials_path: get("SYLLABI_CREDENTIALS")
                .map_or_else(|| PathBuf::from("credentials.json"), PathBuf::from),
            token_path: get("SYLLABI_TOKEN")
                .map_or_else(|| PathBuf::from("token.json"), PathBuf::from),
            record_dir: get("SYLLABI_RECORD").map(PathBuf::from),
            replay_dir: get("SYLLABI_REPLAY").map(PathBuf::from),
        }
    }

    /// Returns the backend settings required by `sync`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing variables.
    pub fn backend(&self) -> Result<BackendConfig, String> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => {
                Ok(BackendConfig { url: url.clone(), key: key.clone(), table: self.table.clone() })
            }
            (url, key) => {
                let missing: Vec<&str> =
                    [("SUPABASE_URL", url.is_none()), ("SUPABASE_KEY", key.is_none())]
                        .into_iter()
                        .filter_map(|(name, is_missing)| is_missing.then_some(name))
                        .collect();
                Err(format!("Missing backend configuration: set {}", missing.join(" and ")))
            }
        }
    }
}
