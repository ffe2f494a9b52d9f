//! Template catalog loading.
//!
//! The surrounding application owns the transport to the REST backend; this
//! module only defines what a form session needs from it and how the
//! responses are read. Everything fetched here is an immutable snapshot for
//! the lifetime of one session.

use crate::ports::UsedPortSet;
use crate::templates::{ImageTemplate, TemplateCatalog};
use crate::{ConsoleError, Result, log_debug, log_warn};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One `{ key, value }` pair from the system settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalEnvEntry {
    pub key: String,
    pub value: String,
}

/// System-wide environment values that pre-fill and lock matching keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOverrides {
    values: HashMap<String, String>,
}

impl GlobalOverrides {
    pub fn new(entries: impl IntoIterator<Item = GlobalEnvEntry>) -> Self {
        Self {
            values: entries
                .into_iter()
                .map(|entry| (entry.key, entry.value))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEnvVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPort {
    pub private_port: u16,
    pub public_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedVolume {
    pub name: String,
    pub container_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNetwork {
    pub name: String,
    #[serde(default)]
    pub ip: String,
}

/// A previously created container, fetched when the form opens in edit mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContainer {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub env_variables: Vec<SavedEnvVariable>,
    #[serde(default)]
    pub ports: Vec<SavedPort>,
    #[serde(default)]
    pub volumes: Vec<SavedVolume>,
    #[serde(default)]
    pub network: Option<SavedNetwork>,
}

impl SavedContainer {
    pub fn saved_values(&self) -> HashMap<String, String> {
        self.env_variables
            .iter()
            .map(|var| (var.key.clone(), var.value.clone()))
            .collect()
    }
}

/// Read side of the backend API used by a form session.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_templates(&self) -> Result<Vec<ImageTemplate>>;

    async fn fetch_global_env(&self) -> Result<Vec<GlobalEnvEntry>>;

    async fn fetch_used_ports(&self) -> Result<Vec<u16>>;

    async fn fetch_container(&self, name: &str) -> Result<SavedContainer>;
}

/// Everything a session loads once when the form opens.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub catalog: TemplateCatalog,
    pub overrides: GlobalOverrides,
    pub used_ports: UsedPortSet,
}

pub async fn load_snapshot(source: &dyn CatalogSource) -> Result<SessionSnapshot> {
    let templates = source
        .fetch_templates()
        .await
        .map_err(|e| as_load_error("template catalog", e))?;
    let overrides = source
        .fetch_global_env()
        .await
        .map_err(|e| as_load_error("global environment", e))?;
    let used_ports = source
        .fetch_used_ports()
        .await
        .map_err(|e| as_load_error("used ports", e))?;

    log_debug!(
        "Loaded {} templates, {} global overrides, {} used ports",
        templates.len(),
        overrides.len(),
        used_ports.len()
    );

    Ok(SessionSnapshot {
        catalog: TemplateCatalog::new(templates),
        overrides: GlobalOverrides::new(overrides),
        used_ports: UsedPortSet::new(used_ports),
    })
}

fn as_load_error(resource: &str, err: ConsoleError) -> ConsoleError {
    log_warn!("Failed to load {}: {}", resource, err);
    match err {
        ConsoleError::Load { .. } => err,
        other => ConsoleError::load(resource, other),
    }
}

/// Reads backend responses saved as JSON files:
///
/// ```text
/// <dir>/templates.json
/// <dir>/global_env.json
/// <dir>/used_ports.json
/// <dir>/containers/<name>.json
/// ```
///
/// A missing `global_env.json` or `used_ports.json` means "none".
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    root: PathBuf,
}

impl JsonCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json<T: DeserializeOwned>(&self, relative: &Path) -> Result<T> {
        let path = self.root.join(relative);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConsoleError::load(&path.display().to_string(), e))?;
        serde_json::from_str(&contents)
            .map_err(|e| ConsoleError::load(&path.display().to_string(), e))
    }

    async fn read_optional<T: DeserializeOwned + Default>(&self, relative: &str) -> Result<T> {
        if !tokio::fs::try_exists(self.root.join(relative)).await? {
            return Ok(T::default());
        }
        self.read_json(Path::new(relative)).await
    }
}

#[async_trait]
impl CatalogSource for JsonCatalog {
    async fn fetch_templates(&self) -> Result<Vec<ImageTemplate>> {
        self.read_json(Path::new("templates.json")).await
    }

    async fn fetch_global_env(&self) -> Result<Vec<GlobalEnvEntry>> {
        self.read_optional("global_env.json").await
    }

    async fn fetch_used_ports(&self) -> Result<Vec<u16>> {
        self.read_optional("used_ports.json").await
    }

    async fn fetch_container(&self, name: &str) -> Result<SavedContainer> {
        let relative = Path::new("containers").join(format!("{}.json", name));
        if !tokio::fs::try_exists(self.root.join(&relative)).await? {
            return Err(ConsoleError::ContainerNotFound(name.to_string()));
        }
        self.read_json(&relative).await
    }
}

/// In-memory source for hosts that already hold the backend data.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub templates: Vec<ImageTemplate>,
    pub global_env: Vec<GlobalEnvEntry>,
    pub used_ports: Vec<u16>,
    pub containers: Vec<SavedContainer>,
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_templates(&self) -> Result<Vec<ImageTemplate>> {
        Ok(self.templates.clone())
    }

    async fn fetch_global_env(&self) -> Result<Vec<GlobalEnvEntry>> {
        Ok(self.global_env.clone())
    }

    async fn fetch_used_ports(&self) -> Result<Vec<u16>> {
        Ok(self.used_ports.clone())
    }

    async fn fetch_container(&self, name: &str) -> Result<SavedContainer> {
        self.containers
            .iter()
            .find(|container| container.name == name)
            .cloned()
            .ok_or_else(|| ConsoleError::ContainerNotFound(name.to_string()))
    }
}
