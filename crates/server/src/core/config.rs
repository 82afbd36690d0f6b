//! Server configuration

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::accounts::AccountManager;
use crate::core::auth::SessionStore;
use crate::core::db::Database;
use crate::passes::notifier::Notifier;
use crate::passes::PassManager;

/// Configuration for the pass desk server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Data root directory
    pub root: PathBuf,
    /// SQLite database file
    pub db_path: PathBuf,
    /// HTTP port
    pub port: u16,
    /// Session lifetime in days
    pub session_ttl_days: i64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_base_dir(pass_common::pass_root())
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

impl ServerConfig {
    /// Create config with a custom data root
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let root = base_dir.into();
        Self {
            db_path: pass_common::db_path_in(&root),
            root,
            port: 3001,
            session_ttl_days: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Load from `PASS_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: try_load("PASS_PORT", defaults.port),
            session_ttl_days: try_load("PASS_SESSION_TTL_DAYS", defaults.session_ttl_days),
            bcrypt_cost: try_load("PASS_BCRYPT_COST", defaults.bcrypt_cost),
            ..defaults
        }
    }

    /// Ensure the data directories exist
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        pass_common::init_structure(&self.root)?;
        pass_common::ensure_parent(&self.db_path)?;
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub accounts: Arc<AccountManager>,
    pub sessions: Arc<SessionStore>,
    pub passes: Arc<PassManager>,
}

impl AppState {
    /// Wire the services over one database. Migrations are not run here.
    pub fn new(config: ServerConfig, notifier: Arc<dyn Notifier>) -> Self {
        let db = Database::new(&config.db_path);
        let sessions = Arc::new(SessionStore::new(
            db.clone(),
            chrono::Duration::days(config.session_ttl_days),
        ));
        let accounts = Arc::new(AccountManager::new(
            db.clone(),
            sessions.clone(),
            config.bcrypt_cost,
        ));
        let passes = Arc::new(PassManager::new(db, notifier));

        Self {
            config: Arc::new(config),
            accounts,
            sessions,
            passes,
        }
    }

    pub fn database(&self) -> Database {
        Database::new(&self.config.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_dir_places_db_under_root() {
        let config = ServerConfig::with_base_dir("/tmp/pass-root");
        assert_eq!(config.root, PathBuf::from("/tmp/pass-root"));
        assert_eq!(
            config.db_path,
            PathBuf::from("/tmp/pass-root/local/passes.sqlite")
        );
        assert_eq!(config.port, 3001);
        assert_eq!(config.session_ttl_days, 30);
    }

    #[test]
    fn test_try_load_falls_back_on_garbage() {
        std::env::set_var("PASS_TEST_GARBAGE_PORT", "not-a-port");
        assert_eq!(try_load("PASS_TEST_GARBAGE_PORT", 3001u16), 3001);

        std::env::set_var("PASS_TEST_GOOD_PORT", " 8080 ");
        assert_eq!(try_load("PASS_TEST_GOOD_PORT", 3001u16), 8080);

        assert_eq!(try_load("PASS_TEST_UNSET_VAR", 12i64), 12);
    }
}
