//! Credentials store
//!
//! Long-lived API credentials live in a TOML file under the user config
//! directory. The file holds the account email and API key used for basic
//! auth against the control plane.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Stored API credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// API key obtained at login
    pub api_key: String,
}

/// Get the Skylark configuration directory
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skylark")
}

/// Path of the credentials file
pub fn credentials_path() -> PathBuf {
    config_dir().join("credentials.toml")
}

/// Load credentials from the default location
pub fn load() -> Result<Credentials, ConfigError> {
    load_from(&credentials_path())
}

/// Load credentials from an explicit path
pub fn load_from(path: &std::path::Path) -> Result<Credentials, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read credentials: {}", e)))?;

    let credentials: Credentials = toml::from_str(&content)?;
    Ok(credentials)
}

/// Save credentials to the default location
pub fn save(credentials: &Credentials) -> Result<(), ConfigError> {
    save_to(&credentials_path(), credentials)
}

/// Save credentials to an explicit path
pub fn save_to(path: &std::path::Path, credentials: &Credentials) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(credentials)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write credentials: {}", e)))?;

    // The file holds an API key; keep it owner-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .map_err(|e| ConfigError::Invalid(format!("Failed to set permissions: {}", e)))?;
    }

    Ok(())
}

/// Remove stored credentials (logout). Missing file is not an error.
pub fn clear() -> Result<(), ConfigError> {
    clear_at(&credentials_path())
}

/// Remove credentials at an explicit path
pub fn clear_at(path: &std::path::Path) -> Result<(), ConfigError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::Invalid(format!(
            "Failed to remove credentials: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let creds = Credentials {
            email: "dev@example.com".to_string(),
            api_key: "b204b8cc".to_string(),
        };
        save_to(&path, &creds).unwrap();

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded, creds);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        match load_from(&path) {
            Err(ConfigError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let creds = Credentials {
            email: "dev@example.com".to_string(),
            api_key: "b204b8cc".to_string(),
        };
        save_to(&path, &creds).unwrap();

        clear_at(&path).unwrap();
        assert!(!path.exists());
        // A second clear must not fail.
        clear_at(&path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let creds = Credentials {
            email: "dev@example.com".to_string(),
            api_key: "b204b8cc".to_string(),
        };
        save_to(&path, &creds).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
