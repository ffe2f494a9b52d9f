//! In-progress container definition held by the create/edit form.
//!
//! Rows carry locally generated ids with no meaning outside the session;
//! they are dropped when the form is packaged.

use crate::catalog::SavedContainer;
use crate::templates::ImageTemplate;
use crate::{ConsoleError, Result, log_debug};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEnvRow {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub is_required: bool,
    /// Pre-filled from a global override; never editable.
    pub is_global: bool,
    /// Declared by the selected template (as opposed to added by hand).
    pub is_declared: bool,
}

impl FormEnvRow {
    pub fn declared(key: &str, value: String, is_required: bool, is_global: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.to_string(),
            value,
            is_required,
            is_global,
            is_declared: true,
        }
    }

    pub fn free_form() -> Self {
        Self {
            id: Uuid::new_v4(),
            key: String::new(),
            value: String::new(),
            is_required: false,
            is_global: false,
            is_declared: false,
        }
    }

    /// Equality ignoring the synthetic id.
    pub fn same_content(&self, other: &FormEnvRow) -> bool {
        self.key == other.key
            && self.value == other.value
            && self.is_required == other.is_required
            && self.is_global == other.is_global
            && self.is_declared == other.is_declared
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPortMapping {
    pub id: Uuid,
    pub private_port: String,
    pub public_port: String,
}

impl FormPortMapping {
    pub fn new(private_port: &str, public_port: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            private_port: private_port.to_string(),
            public_port: public_port.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormVolumeMapping {
    pub id: Uuid,
    pub name: String,
    pub container_path: String,
}

impl FormVolumeMapping {
    pub fn new(name: &str, container_path: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            container_path: container_path.to_string(),
        }
    }
}

/// Empty name means the default network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormNetworkConfig {
    pub name: String,
    pub ip: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContainerForm {
    name: String,
    template_id: Option<String>,
    env: Vec<FormEnvRow>,
    ports: Vec<FormPortMapping>,
    volumes: Vec<FormVolumeMapping>,
    network: FormNetworkConfig,
    saved_values: Option<HashMap<String, String>>,
}

impl ContainerForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-populated from a saved container. Env rows are resolved
    /// separately against the saved values.
    pub fn from_saved(saved: &SavedContainer, template_id: &str) -> Self {
        Self {
            name: saved.name.clone(),
            template_id: Some(template_id.to_string()),
            env: Vec::new(),
            ports: saved
                .ports
                .iter()
                .map(|p| {
                    FormPortMapping::new(&p.private_port.to_string(), &p.public_port.to_string())
                })
                .collect(),
            volumes: saved
                .volumes
                .iter()
                .map(|v| FormVolumeMapping::new(&v.name, &v.container_path))
                .collect(),
            network: saved
                .network
                .as_ref()
                .map(|n| FormNetworkConfig {
                    name: n.name.clone(),
                    ip: n.ip.clone(),
                })
                .unwrap_or_default(),
            saved_values: Some(saved.saved_values()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn env_rows(&self) -> &[FormEnvRow] {
        &self.env
    }

    pub fn port_rows(&self) -> &[FormPortMapping] {
        &self.ports
    }

    pub fn volume_rows(&self) -> &[FormVolumeMapping] {
        &self.volumes
    }

    pub fn network(&self) -> &FormNetworkConfig {
        &self.network
    }

    pub fn saved_values(&self) -> Option<&HashMap<String, String>> {
        self.saved_values.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.saved_values.is_some()
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub(crate) fn set_template_id(&mut self, template_id: Option<String>) {
        self.template_id = template_id;
    }

    /// Resolution always replaces the whole sequence.
    pub(crate) fn replace_env_rows(&mut self, rows: Vec<FormEnvRow>) {
        self.env = rows;
    }

    pub fn set_env_value(&mut self, row_id: Uuid, value: &str) -> Result<()> {
        let row = self.env_row_mut(row_id)?;
        if row.is_global {
            return Err(ConsoleError::LockedVariable(row.key.clone()));
        }
        row.value = value.to_string();
        Ok(())
    }

    /// Only hand-added rows can be renamed; declared keys are fixed. A key
    /// held by another row is rejected so a global value cannot be shadowed.
    pub fn set_env_key(&mut self, row_id: Uuid, key: &str) -> Result<()> {
        let trimmed = key.trim();
        if !trimmed.is_empty() && self.has_env_key_except(trimmed, row_id) {
            return Err(ConsoleError::DuplicateKey(trimmed.to_string()));
        }
        let row = self.env_row_mut(row_id)?;
        if row.is_global || row.is_declared {
            return Err(ConsoleError::LockedVariable(row.key.clone()));
        }
        row.key = key.to_string();
        Ok(())
    }

    fn has_env_key_except(&self, key: &str, row_id: Uuid) -> bool {
        self.env
            .iter()
            .any(|row| row.id != row_id && row.key.trim() == key)
    }

    pub fn add_env_row(&mut self) -> Uuid {
        let row = FormEnvRow::free_form();
        let id = row.id;
        self.env.push(row);
        id
    }

    pub fn remove_env_row(&mut self, row_id: Uuid) -> Result<()> {
        let index = self
            .env
            .iter()
            .position(|row| row.id == row_id)
            .ok_or(ConsoleError::RowNotFound(row_id))?;
        if self.env[index].is_declared {
            return Err(ConsoleError::LockedVariable(self.env[index].key.clone()));
        }
        self.env.remove(index);
        Ok(())
    }

    pub fn add_port_row(&mut self) -> Uuid {
        let row = FormPortMapping::new("", "");
        let id = row.id;
        self.ports.push(row);
        id
    }

    pub fn set_port_row(&mut self, row_id: Uuid, private_port: &str, public_port: &str) -> Result<()> {
        let row = self
            .ports
            .iter_mut()
            .find(|row| row.id == row_id)
            .ok_or(ConsoleError::RowNotFound(row_id))?;
        row.private_port = private_port.to_string();
        row.public_port = public_port.to_string();
        Ok(())
    }

    pub fn remove_port_row(&mut self, row_id: Uuid) -> Result<()> {
        let before = self.ports.len();
        self.ports.retain(|row| row.id != row_id);
        if self.ports.len() == before {
            return Err(ConsoleError::RowNotFound(row_id));
        }
        Ok(())
    }

    pub fn add_volume_row(&mut self) -> Uuid {
        let row = FormVolumeMapping::new("", "");
        let id = row.id;
        self.volumes.push(row);
        id
    }

    pub fn set_volume_row(&mut self, row_id: Uuid, name: &str, container_path: &str) -> Result<()> {
        let row = self
            .volumes
            .iter_mut()
            .find(|row| row.id == row_id)
            .ok_or(ConsoleError::RowNotFound(row_id))?;
        row.name = name.to_string();
        row.container_path = container_path.to_string();
        Ok(())
    }

    pub fn remove_volume_row(&mut self, row_id: Uuid) -> Result<()> {
        let before = self.volumes.len();
        self.volumes.retain(|row| row.id != row_id);
        if self.volumes.len() == before {
            return Err(ConsoleError::RowNotFound(row_id));
        }
        Ok(())
    }

    pub fn set_network_name(&mut self, name: &str) {
        self.network.name = name.to_string();
    }

    pub fn set_network_ip(&mut self, ip: &str) {
        self.network.ip = ip.to_string();
    }

    /// Seeds a port row for the template's default port and a volume row
    /// for its data path, unless rows for them already exist.
    pub fn apply_template_defaults(&mut self, template: &ImageTemplate) {
        if let Some(port) = template.default_port {
            let port = port.to_string();
            if !self.ports.iter().any(|row| row.private_port.trim() == port) {
                log_debug!("Seeding port row {} from template '{}'", port, template.name);
                self.ports.push(FormPortMapping::new(&port, ""));
            }
        }

        if let Some(path) = template.data_path.as_deref().filter(|p| !p.is_empty()) {
            if !self.volumes.iter().any(|row| row.container_path == path) {
                let volume = if self.name.trim().is_empty() {
                    "data".to_string()
                } else {
                    format!("{}-data", self.name.trim())
                };
                log_debug!("Seeding volume {} -> {}", volume, path);
                self.volumes.push(FormVolumeMapping::new(&volume, path));
            }
        }
    }

    fn env_row_mut(&mut self, row_id: Uuid) -> Result<&mut FormEnvRow> {
        self.env
            .iter_mut()
            .find(|row| row.id == row_id)
            .ok_or(ConsoleError::RowNotFound(row_id))
    }
}
