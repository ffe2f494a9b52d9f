use crate::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "gponctl.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding the JSON snapshot of the backend responses
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Variable pre-filled with the container's own display name
    #[serde(default = "default_container_name_key")]
    pub container_name_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Host used in the public URL when the form has no network IP
    #[serde(default = "default_public_host_fallback")]
    pub public_host_fallback: String,
    /// Host used in the private URL when the container name is empty
    #[serde(default = "default_private_host_fallback")]
    pub private_host_fallback: String,
    #[serde(default = "default_postgres_database")]
    pub postgres_default_database: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            container_name_key: default_container_name_key(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            public_host_fallback: default_public_host_fallback(),
            private_host_fallback: default_private_host_fallback(),
            postgres_default_database: default_postgres_database(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("demos/snapshot")
}

fn default_container_name_key() -> String {
    "CONTAINER_NAME".to_string()
}

fn default_public_host_fallback() -> String {
    "SERVER_IP".to_string()
}

fn default_private_host_fallback() -> String {
    "CONTAINER_NAME".to_string()
}

fn default_postgres_database() -> String {
    "postgres".to_string()
}

impl ConsoleConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ConsoleConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_str(contents: &str) -> Result<Self> {
        let config: ConsoleConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConsoleError::ConfigError(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/gponctl/gponctl.toml`, or the working directory
    /// when no config dir is known.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("gponctl").join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    fn validate(&self) -> Result<()> {
        if self.form.container_name_key.trim().is_empty() {
            return Err(ConsoleError::ConfigError(
                "form.container_name_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
