use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FragError, Result};

/// Main configuration structure
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct CatalogConfig {
    /// Absolute URL of the catalog document. When unset, the catalog is
    /// looked up as `models.json` under the asset base.
    pub url: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct AssetsConfig {
    /// Base URL that relative fragment paths resolve against
    pub base_url: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

// Default value functions
fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults if
    /// the file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Default config file path: `$XDG_CONFIG_HOME/fragpack/config.toml`
    /// (or `~/.config/fragpack/config.toml`)
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| FragError::Config("could not determine config directory".to_string()))?;
        Ok(dir.join("fragpack").join("config.toml"))
    }

    /// Load config from an explicit path, falling back to defaults if the
    /// file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| FragError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| FragError::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.catalog.url.is_none());
        assert!(config.assets.base_url.is_none());
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.http.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn full_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[catalog]\nurl = \"https://cdn.example.com/packs/catalog.json\"\n\n\
             [assets]\nbase_url = \"https://cdn.example.com/packs\"\n\n\
             [http]\nconnect_timeout_secs = 3"
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.catalog.url.as_deref(),
            Some("https://cdn.example.com/packs/catalog.json")
        );
        assert_eq!(
            config.assets.base_url.as_deref(),
            Some("https://cdn.example.com/packs")
        );
        assert_eq!(config.http.connect_timeout_secs, 3);
    }

    #[test]
    fn partial_config_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[assets]\nbase_url = \"/local-assets\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.assets.base_url.as_deref(), Some("/local-assets"));
        assert!(config.catalog.url.is_none());
        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(FragError::Config(_))
        ));
    }
}
