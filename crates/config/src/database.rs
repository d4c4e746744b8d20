//! Database configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Database configuration
///
/// ```toml
/// [database]
/// path = "~/.gitadora/gitadora.db"   # default
/// max_connections = 5                 # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; `~/` is expanded at runtime
    pub path: Option<PathBuf>,

    /// Pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Database file path with `~` expanded
    pub fn resolved_path(&self) -> PathBuf {
        match self.path {
            Some(ref path) => expand_tilde(path),
            None => dirs::home_dir()
                .map(|h| h.join(".gitadora").join("gitadora.db"))
                .unwrap_or_else(|| PathBuf::from("./data/gitadora.db")),
        }
    }
}

/// Expand ~ to home directory
fn expand_tilde(path: &Path) -> PathBuf {
    path.to_str()
        .and_then(|s| s.strip_prefix("~/"))
        .and_then(|stripped| dirs::home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_ends_with_db_file() {
        let config = DatabaseConfig::default();
        assert!(config.resolved_path().ends_with("gitadora.db"));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_explicit_path() {
        let config: DatabaseConfig = toml::from_str(r#"path = "/var/lib/gitadora/db.sqlite""#).unwrap();
        assert_eq!(config.resolved_path(), PathBuf::from("/var/lib/gitadora/db.sqlite"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(Path::new("~/test/path"));
        if dirs::home_dir().is_some() {
            assert!(!expanded.to_string_lossy().starts_with('~'));
        }
        assert_eq!(expand_tilde(Path::new("relative/db")), PathBuf::from("relative/db"));
    }
}
