// Cache path utilities.
// Locates the per-user cache directory and the files folio keeps in it.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/folio on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "folio").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the log file inside a cache directory.
pub fn log_path(dir: &std::path::Path) -> PathBuf {
    dir.join("folio.log")
}
