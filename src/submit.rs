use crate::form::ContainerForm;
use crate::ports::{UsedPortSet, conflicting_ports, parse_port};
use crate::templates::TemplateCatalog;
use crate::{ConsoleError, Result, log_warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized container definition handed to the instance-creation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPayload {
    /// Correlates a not-yet-persisted container within a creation batch.
    pub temp_id: Uuid,
    pub name: String,
    pub image: String,
    pub env_variables: Vec<PayloadEnvVariable>,
    pub ports: Vec<PayloadPort>,
    pub volumes: Vec<PayloadVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<PayloadNetwork>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadEnvVariable {
    pub key: String,
    pub value: String,
    pub is_required: bool,
    pub is_global: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadPort {
    pub private_port: u16,
    pub public_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadVolume {
    pub name: String,
    pub container_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadNetwork {
    pub name: String,
    pub ip: String,
}

pub struct Packager<'a> {
    catalog: &'a TemplateCatalog,
    used_ports: &'a UsedPortSet,
    container_name_key: &'a str,
}

impl<'a> Packager<'a> {
    pub fn new(
        catalog: &'a TemplateCatalog,
        used_ports: &'a UsedPortSet,
        container_name_key: &'a str,
    ) -> Self {
        Self {
            catalog,
            used_ports,
            container_name_key,
        }
    }

    /// Required values, then port conflicts, then the template lookup.
    /// The first failing check rejects the form.
    pub fn validate(&self, form: &ContainerForm) -> Result<()> {
        let missing: Vec<String> = form
            .env_rows()
            .iter()
            .filter(|row| row.is_required && !row.is_global)
            .filter(|row| row.key != self.container_name_key)
            .filter(|row| row.value.trim().is_empty())
            .map(|row| row.key.clone())
            .collect();
        if !missing.is_empty() {
            log_warn!("Rejecting container form, missing: {}", missing.join(", "));
            return Err(ConsoleError::MissingRequired(missing));
        }

        let conflicts = conflicting_ports(form.port_rows(), self.used_ports);
        if !conflicts.is_empty() {
            log_warn!("Rejecting container form, ports in use: {:?}", conflicts);
            return Err(ConsoleError::PortConflict(conflicts));
        }

        self.resolve_image(form)?;
        Ok(())
    }

    pub fn package(&self, form: &ContainerForm, temp_id: Uuid) -> Result<ContainerPayload> {
        self.validate(form)?;
        let image = self.resolve_image(form)?;

        let env_variables = form
            .env_rows()
            .iter()
            .filter(|row| !row.key.trim().is_empty())
            .map(|row| PayloadEnvVariable {
                key: row.key.trim().to_string(),
                value: row.value.clone(),
                is_required: row.is_required,
                is_global: row.is_global,
            })
            .collect();

        let ports = form
            .port_rows()
            .iter()
            .filter_map(|row| {
                Some(PayloadPort {
                    private_port: parse_port(&row.private_port)?,
                    public_port: parse_port(&row.public_port)?,
                })
            })
            .collect();

        let volumes = form
            .volume_rows()
            .iter()
            .filter(|row| !row.name.trim().is_empty() && !row.container_path.trim().is_empty())
            .map(|row| PayloadVolume {
                name: row.name.trim().to_string(),
                container_path: row.container_path.trim().to_string(),
            })
            .collect();

        let network = form.network();
        let network = (!network.name.trim().is_empty()).then(|| PayloadNetwork {
            name: network.name.trim().to_string(),
            ip: network.ip.trim().to_string(),
        });

        Ok(ContainerPayload {
            temp_id,
            name: form.name().trim().to_string(),
            image,
            env_variables,
            ports,
            volumes,
            network,
        })
    }

    fn resolve_image(&self, form: &ContainerForm) -> Result<String> {
        let template_id = form.template_id().unwrap_or_default();
        self.catalog
            .get_template(template_id)
            .map(|template| template.image.clone())
            .ok_or_else(|| ConsoleError::TemplateNotFound(template_id.to_string()))
    }
}
