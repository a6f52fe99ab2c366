use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::models::Rotation;
use crate::domain::swap_engine::SwapPolicy;
use crate::error::{Result, RosterError};
use crate::infrastructure::webhook_repo::WebhookShape;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RosterConfig {
    #[serde(default = "default_rotation")]
    pub rotation: Vec<String>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub swap_policy: SwapPolicy,
    /// Where the swap log CSV is written
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Nothing outlives the process
    #[default]
    Memory,
    Sqlite {
        path: PathBuf,
    },
    Webhook {
        url: String,
        #[serde(default)]
        shape: WebhookShape,
    },
}

fn default_rotation() -> Vec<String> {
    Rotation::default()
        .roles()
        .iter()
        .map(|r| r.as_str().to_string())
        .collect()
}

fn default_log_path() -> PathBuf {
    PathBuf::from("swap_log.csv")
}

impl RosterConfig {
    /// Reads `path`, falling back to defaults when it is missing or unreadable
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return config,
                    Err(e) => log::warn!("Failed to parse {}: {}", path.display(), e),
                },
                Err(e) => log::warn!("Failed to read {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RosterError::Config(e.to_string()))
    }

    pub fn rotation(&self) -> Result<Rotation> {
        Rotation::new(&self.rotation)
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            rotation: default_rotation(),
            backend: BackendConfig::default(),
            swap_policy: SwapPolicy::default(),
            log_path: default_log_path(),
        }
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = RosterConfig::parse("").unwrap();
        assert_eq!(config, RosterConfig::default());
        assert_eq!(config.rotation, vec!["DC", "2IC", "DSM", "HD DCS"]);
    }

    #[test]
    fn webhook_backend_section() {
        let config = RosterConfig::parse(
            r#"
            rotation = ["A", "B", "C"]
            swap_policy = "overwrite"

            [backend]
            kind = "webhook"
            url = "https://example.invalid/exec"
            shape = "records"
            "#,
        )
        .unwrap();

        assert_eq!(config.rotation().unwrap().roles().len(), 3);
        assert_eq!(config.swap_policy, SwapPolicy::Overwrite);
        assert_eq!(
            config.backend,
            BackendConfig::Webhook {
                url: "https://example.invalid/exec".to_string(),
                shape: WebhookShape::Records,
            }
        );
    }

    #[test]
    fn sqlite_backend_section() {
        let config = RosterConfig::parse("[backend]\nkind = \"sqlite\"\npath = \"roster.db\"\n").unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite { path: PathBuf::from("roster.db") }
        );
    }

    #[test]
    fn bad_rotation_is_a_config_error() {
        let config = RosterConfig::parse("rotation = []").unwrap();
        assert!(matches!(config.rotation(), Err(RosterError::Config(_))));
        assert!(RosterConfig::parse("rotation = 3").is_err());
    }

    #[test]
    fn missing_file_falls_back() {
        let config = RosterConfig::load(Path::new("/nonexistent/roster.toml"));
        assert_eq!(config, RosterConfig::default());
    }
}
