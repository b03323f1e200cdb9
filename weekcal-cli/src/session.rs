//! The signed-in session token, kept between CLI invocations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Contents of ~/.config/weekcal/session.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub token: String,
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SavedSession {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("weekcal");

        Ok(config_dir.join("session.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let session = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(session))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn remove_at(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }

    /// The saved session, or an error telling the user to sign in.
    pub fn require() -> Result<Self> {
        Self::load_from(&Self::path()?)?
            .ok_or_else(|| anyhow::anyhow!("Not signed in.\n\nSign in with:\n  weekcal sign-in"))
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekcal").join("session.toml");

        assert_eq!(SavedSession::load_from(&path).unwrap(), None);

        let session = SavedSession {
            token: "tok-1".into(),
            uid: "camille".into(),
            display_name: None,
        };
        session.save_to(&path).unwrap();
        assert_eq!(SavedSession::load_from(&path).unwrap(), Some(session.clone()));
        assert_eq!(session.label(), "camille");

        SavedSession::remove_at(&path).unwrap();
        assert!(!path.exists());
        SavedSession::remove_at(&path).unwrap();
    }
}
