//! Global weekcal configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::auth::FirebaseAuthConfig;
use crate::constants::{DEFAULT_FIRESTORE_URL, DEFAULT_IDENTITY_TOOLKIT_URL, DEFAULT_SERVER_PORT};
use crate::error::{WeekcalError, WeekcalResult};
use crate::remote::FirestoreConfig;

static DEFAULT_CACHE_DIR: &str = "~/.local/share/weekcal/snapshots";

/// Prefix of environment overrides, e.g. `WEEKCAL_SERVER__PORT=5000`.
pub const ENV_PREFIX: &str = "WEEKCAL";

fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("weekcal").join("snapshots"))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
}

fn default_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_firestore_url() -> String {
    DEFAULT_FIRESTORE_URL.to_string()
}

fn default_identity_toolkit_url() -> String {
    DEFAULT_IDENTITY_TOOLKIT_URL.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteBackend {
    #[default]
    Firestore,
    /// In-process store; data is lost when the server stops.
    Memory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderKind {
    #[default]
    Firebase,
    /// Trusts the credential as the user id. Development only.
    Dev,
}

/// Global configuration at ~/.config/weekcal/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekcalConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub backend: RemoteBackend,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_firestore_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub provider: AuthProviderKind,
    pub api_key: Option<String>,
    #[serde(default = "default_identity_toolkit_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            backend: RemoteBackend::default(),
            project_id: None,
            api_key: None,
            base_url: default_firestore_url(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            provider: AuthProviderKind::default(),
            api_key: None,
            base_url: default_identity_toolkit_url(),
        }
    }
}

impl RemoteConfig {
    pub fn firestore(&self) -> WeekcalResult<FirestoreConfig> {
        let project_id = self.project_id.as_deref().ok_or_else(|| {
            WeekcalError::Config("remote.project_id is required for the firestore backend".into())
        })?;

        let mut config = FirestoreConfig::new(project_id).with_base_url(&self.base_url);
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        Ok(config)
    }
}

impl AuthConfig {
    pub fn firebase(&self) -> WeekcalResult<FirebaseAuthConfig> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            WeekcalError::Config("auth.api_key is required for the firebase provider".into())
        })?;

        Ok(FirebaseAuthConfig::new(api_key).with_base_url(&self.base_url))
    }
}

impl WeekcalConfig {
    pub fn config_path() -> WeekcalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| WeekcalError::Config("Could not determine config directory".into()))?
            .join("weekcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/weekcal/config.toml, writing a commented-out default
    /// first if there is none.
    pub fn load() -> WeekcalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path, None)
    }

    /// Load from `path` with environment overrides. `env` replaces the
    /// process environment when given.
    pub fn load_from(path: &Path, env: Option<HashMap<String, String>>) -> WeekcalResult<Self> {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env.map(|vars| vars.into_iter().collect()));

        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| WeekcalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| WeekcalError::Config(e.to_string()))
    }

    /// Snapshot directory with `~` expanded.
    pub fn cache_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.cache_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> WeekcalResult<()> {
        let contents = format!(
            "\
# weekcal configuration

# Where local task snapshots are kept:
# cache_dir = \"{cache_dir}\"

[server]
# port = {port}

[remote]
# \"firestore\" or \"memory\"
# backend = \"firestore\"
# project_id = \"my-project\"
# api_key = \"...\"
# base_url = \"{firestore}\"

[auth]
# \"firebase\" or \"dev\"
# provider = \"firebase\"
# api_key = \"...\"
# base_url = \"{identity}\"
",
            cache_dir = DEFAULT_CACHE_DIR,
            port = DEFAULT_SERVER_PORT,
            firestore = DEFAULT_FIRESTORE_URL,
            identity = DEFAULT_IDENTITY_TOOLKIT_URL,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WeekcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| WeekcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    #[test]
    fn test_default_config_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekcal").join("config.toml");

        WeekcalConfig::create_default_config(&path).unwrap();
        let config = WeekcalConfig::load_from(&path, no_env()).unwrap();

        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert_eq!(config.remote.backend, RemoteBackend::Firestore);
        assert_eq!(config.auth.provider, AuthProviderKind::Firebase);
        assert!(config.remote.project_id.is_none());
    }

    #[test]
    fn test_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
cache_dir = "~/snapshots"

[server]
port = 5001

[remote]
backend = "memory"

[auth]
provider = "dev"
"#,
        )
        .unwrap();

        let config = WeekcalConfig::load_from(&path, no_env()).unwrap();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.remote.backend, RemoteBackend::Memory);
        assert_eq!(config.auth.provider, AuthProviderKind::Dev);
        assert!(!config.cache_path().to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 5001\n").unwrap();

        let env = HashMap::from([
            ("WEEKCAL_SERVER__PORT".to_string(), "6002".to_string()),
            ("WEEKCAL_REMOTE__PROJECT_ID".to_string(), "planner".to_string()),
        ]);
        let config = WeekcalConfig::load_from(&path, Some(env)).unwrap();

        assert_eq!(config.server.port, 6002);
        assert_eq!(config.remote.project_id.as_deref(), Some("planner"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WeekcalConfig::load_from(&dir.path().join("absent.toml"), no_env()).unwrap();
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
    }

    #[test]
    fn test_firestore_requires_project() {
        let remote = RemoteConfig::default();
        assert!(matches!(remote.firestore(), Err(WeekcalError::Config(_))));

        let remote = RemoteConfig {
            project_id: Some("planner".into()),
            api_key: Some("key".into()),
            ..RemoteConfig::default()
        };
        let firestore = remote.firestore().unwrap();
        assert_eq!(firestore.project_id, "planner");
        assert_eq!(firestore.api_key.as_deref(), Some("key"));
    }
}
