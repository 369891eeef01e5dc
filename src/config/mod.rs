use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub cache_path: String,
    pub session_dir: String,
    pub download_dir: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/settings.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
                user_agent: "LearnifyClient/0.1".to_string(),
            },
            storage: StorageConfig {
                cache_path: "./data/cache.db".to_string(),
                session_dir: "./data/session".to_string(),
                download_dir: "./data/downloads".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut config = AppConfig::default();
        config.api.base_url = "https://lms.example.com/api".to_string();
        config.storage.cache_path = "/tmp/lms.db".to_string();
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://lms.example.com/api");
        assert_eq!(loaded.storage.cache_path, "/tmp/lms.db");
        assert_eq!(loaded.storage.session_dir, "./data/session");
    }
}
