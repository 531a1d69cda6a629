//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "gridline";
const APPLICATION: &str = "gridline-tui";

/// Log file used when no cache directory can be determined.
pub const FALLBACK_LOG: &str = "gridline-tui.log";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the config directory.
///
/// - Linux: `$XDG_CONFIG_HOME/gridline-tui` or `~/.config/gridline-tui`
/// - macOS: `~/Library/Application Support/dev.gridline.gridline-tui`
/// - Windows: `C:\Users\<User>\AppData\Roaming\gridline\gridline-tui\config`
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of `config.json`.
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.json"))
}

fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path of the current log file, `latest.log` in the cache directory.
pub fn log_file() -> PathBuf {
    cache_dir()
        .map(|dir| dir.join("latest.log"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_LOG))
}

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 10;

/// Rename `latest.log` to a timestamped name and prune old logs.
///
/// Call this at startup before creating the new log file.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    if fs::create_dir_all(&cache).is_err() {
        return;
    }
    let latest = cache.join("latest.log");
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, cache.join(format!("{timestamp}.log")));
    }
    cleanup_old_logs(&cache);
}

fn cleanup_old_logs(cache_dir: &Path) {
    let Ok(entries) = fs::read_dir(cache_dir) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != "latest.log"
        })
        .collect();

    // Oldest first
    logs.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());

    if logs.len() > MAX_OLD_LOGS {
        for entry in logs.iter().take(logs.len() - MAX_OLD_LOGS) {
            let _ = fs::remove_file(entry.path());
        }
    }
}
