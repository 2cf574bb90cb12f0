use anyhow::Result;
use std::path::{Path, PathBuf};

const LOG_FOLDER_NAME: &str = "fjord_logs";
const APP_DIR_NAME: &str = "fjord-client";

/// Resolve log folder (absolute path)
pub fn resolve_log_folder(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("Failed to create log folder {:?}: {}", dir, e))?;
        return Ok(dir.to_path_buf());
    }

    // Walk up from CWD looking for an existing `fjord_logs/` so runs from nested dirs share
    // one folder.
    if let Ok(mut dir) = std::env::current_dir() {
        for _ in 0..12 {
            let candidate = dir.join(LOG_FOLDER_NAME);
            if candidate.is_dir() {
                return Ok(candidate);
            }
            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            } else {
                break;
            }
        }
    }

    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    let log_dir = base.join(APP_DIR_NAME).join("logs");
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
    Ok(log_dir)
}

/// Default location of the in-progress submission cache.
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("cache.json")
}

/// Candidate config files, lowest priority first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        out.push(dir.join(APP_DIR_NAME).join("fjord-client.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        out.push(cwd.join("fjord-client.toml"));
    }
    out
}
