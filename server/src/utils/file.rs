//! File utility functions

use std::path::PathBuf;

/// Expand a configured path to an absolute path.
///
/// `~` and `~/rest` resolve against the home directory, relative paths
/// against the current working directory. Surrounding whitespace is ignored
/// and an empty string means the working directory itself.
///
/// ```text
/// expand_path("~/.tracedock") // -> /home/user/.tracedock
/// expand_path("./data")       // -> /current/dir/./data
/// expand_path("/var/lib/td")  // -> /var/lib/td
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if path.is_empty() {
        return cwd();
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        cwd().join(expanded)
    } else {
        expanded
    }
}
