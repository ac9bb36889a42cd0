//! File storage primitives
//!
//! All persistence goes through these helpers: directories are created on
//! demand and every write is atomic (temp file + rename) so a crash never
//! leaves a half-written collection on disk.

pub mod documents;

pub use documents::DocumentStore;

use std::fs;
use std::path::{Path, PathBuf};

/// Result type for file operations
pub type FileResult<T> = Result<T, String>;

/// Default data directory: `~/.pmdesk/data`, or a relative fallback when
/// the home directory cannot be determined
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".pmdesk").join("data"))
        .unwrap_or_else(|| PathBuf::from(".pmdesk/data"))
}

/// Ensure a directory exists, creating it (and parents) if needed
pub fn ensure_dir(path: &Path) -> FileResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
    }
    Ok(())
}

/// Write content atomically: write to a temp file in the same directory,
/// then rename over the target
pub fn atomic_write(path: &Path, content: &str) -> FileResult<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)
        .map_err(|e| format!("Failed to write temp file {:?}: {}", temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to rename {:?} to {:?}: {}", temp_path, path, e)
    })?;

    Ok(())
}

/// Read and deserialize a JSON file
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> FileResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file {:?}: {}", path, e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse JSON {:?}: {}", path, e))
}

/// Serialize and atomically write a JSON file (pretty-printed; the data
/// files are meant to be human-inspectable)
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> FileResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let content = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {:?}: {}", path, e))?;

    atomic_write(path, &content)
}
