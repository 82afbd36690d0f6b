//! Data directory layout for the pass desk
//!
//! Directory layout:
//! ```text
//! pass_data/
//! └── local/           # SQLite database (passes.sqlite)
//! ```
//!
//! The root is resolved from `PASS_ROOT`, then from the persisted config file
//! under the platform config directory, then falls back to `pass_data`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable that overrides the data root
pub const ROOT_ENV: &str = "PASS_ROOT";

const DEFAULT_ROOT: &str = "pass_data";
const DB_FILE: &str = "passes.sqlite";

#[derive(Deserialize, Debug, Default)]
struct RootConfig {
    pass_root: Option<PathBuf>,
}

fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pass_desk").join("config.json"))
}

/// Read a persisted root from a specific config file
pub fn read_root_config(path: &Path) -> Option<PathBuf> {
    if !path.exists() {
        return None;
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<RootConfig>(&content) {
            Ok(config) => config.pass_root,
            Err(e) => {
                warn!("Failed to parse config file at {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to read config file at {:?}: {}", path, e);
            None
        }
    }
}

/// Load the persistent root from the user's config directory
pub fn load_persistent_root() -> Option<PathBuf> {
    read_root_config(&get_config_path()?)
}

/// Data root from environment, persistent config, or default
pub fn pass_root() -> PathBuf {
    if let Ok(val) = std::env::var(ROOT_ENV) {
        return PathBuf::from(val);
    }

    if let Some(root) = load_persistent_root() {
        return root;
    }

    PathBuf::from(DEFAULT_ROOT)
}

/// Local data directory under an explicit root
pub fn local_dir_in(root: &Path) -> PathBuf {
    root.join("local")
}

/// Database file under an explicit root
pub fn db_path_in(root: &Path) -> PathBuf {
    local_dir_in(root).join(DB_FILE)
}

/// Ensure a single directory exists
pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Create the directory structure under `root`.
/// Call this once at startup before opening the database.
pub fn init_structure(root: &Path) -> anyhow::Result<PathBuf> {
    ensure_dir(root)?;
    ensure_dir(&local_dir_in(root))?;

    let canonical = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    info!("Pass desk directory structure initialized at: {:?}", canonical);

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_db_path_lives_under_local() {
        let path = db_path_in(Path::new("/srv/passes"));
        assert_eq!(path, PathBuf::from("/srv/passes/local/passes.sqlite"));
    }

    #[test]
    fn test_init_structure_creates_local_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested");

        init_structure(&root).unwrap();

        assert!(local_dir_in(&root).is_dir());
    }

    #[test]
    fn test_read_root_config() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");

        assert!(read_root_config(&config).is_none());
        fs::write(&config, r#"{ "pass_root": "/data/passes" }"#).unwrap();
        assert_eq!(
            read_root_config(&config),
            Some(PathBuf::from("/data/passes"))
        );
    }

    #[test]
    fn test_root_config_without_root() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        fs::write(&config, "{}").unwrap();

        assert!(read_root_config(&config).is_none());
    }

    #[test]
    fn test_malformed_root_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        fs::write(&config, "{ not json").unwrap();

        assert!(read_root_config(&config).is_none());
    }
}
