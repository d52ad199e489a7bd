//! Filesystem layout for Mentor's data directory.
//!
//! ```text
//! base_dir/                 (default: ~/.mentor)
//! ├── config.json
//! ├── api_keys.json
//! └── sessions/
//!     ├── mentor_session_20240101_120000.json
//!     └── ...
//! ```

use std::path::{Path, PathBuf};

use mentor_core::{MentorError, Result};

/// Resolves the default base directory (`~/.mentor`).
///
/// # Errors
///
/// Returns a `Config` error when the home directory cannot be determined.
pub fn default_base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".mentor"))
        .ok_or_else(|| MentorError::config("failed to determine home directory"))
}

/// The sessions directory under a base directory.
pub fn sessions_dir(base_dir: &Path) -> PathBuf {
    base_dir.join("sessions")
}

/// The configuration file under a base directory.
pub fn config_file(base_dir: &Path) -> PathBuf {
    base_dir.join("config.json")
}

/// The API-key file under a base directory.
pub fn api_keys_file(base_dir: &Path) -> PathBuf {
    base_dir.join("api_keys.json")
}
