use serde::{Deserialize, Deserializer, Serialize};

/// A deployable image definition, as served by the template endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTemplate {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    /// `registry/name:tag`
    pub image: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub default_port: Option<u16>,
    #[serde(default)]
    pub healthcheck: Option<Healthcheck>,
    #[serde(default)]
    pub env_definitions: Vec<EnvDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvDefinition {
    pub key: String,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Healthcheck {
    pub test: Vec<String>,
    /// Seconds between checks
    #[serde(default)]
    pub interval: Option<u32>,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub retries: Option<u32>,
}

impl ImageTemplate {
    pub fn env_definition(&self, key: &str) -> Option<&EnvDefinition> {
        self.env_definitions.iter().find(|def| def.key == key)
    }

    pub fn required_keys(&self) -> Vec<&str> {
        self.env_definitions
            .iter()
            .filter(|def| def.is_required)
            .map(|def| def.key.as_str())
            .collect()
    }
}

/// Read-only catalog of the templates loaded for one form session.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<ImageTemplate>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<ImageTemplate>) -> Self {
        Self { templates }
    }

    pub fn get_templates(&self) -> &[ImageTemplate] {
        &self.templates
    }

    pub fn get_template(&self, id: &str) -> Option<&ImageTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Exact image-reference match, used to recover the template of a
    /// saved container.
    pub fn find_by_image(&self, image: &str) -> Option<&ImageTemplate> {
        self.templates.iter().find(|t| t.image == image)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}
