use crate::catalog::GlobalOverrides;
use crate::form::FormEnvRow;
use crate::templates::EnvDefinition;
use std::collections::HashMap;

pub const NO_ENV_NOTICE: &str = "This template does not declare any environment variables.";

/// Builds the working env rows for a template.
pub struct EnvResolver<'a> {
    overrides: &'a GlobalOverrides,
    container_name_key: &'a str,
}

impl<'a> EnvResolver<'a> {
    pub fn new(overrides: &'a GlobalOverrides, container_name_key: &'a str) -> Self {
        Self {
            overrides,
            container_name_key,
        }
    }

    /// One row per definition, in declared order. Per key, first match wins:
    /// saved value (edit mode), global override (locked), the container name
    /// for the conventional name key, then empty.
    pub fn resolve(
        &self,
        definitions: &[EnvDefinition],
        container_name: &str,
        saved_values: Option<&HashMap<String, String>>,
    ) -> Vec<FormEnvRow> {
        definitions
            .iter()
            .map(|def| self.resolve_one(def, container_name, saved_values))
            .collect()
    }

    fn resolve_one(
        &self,
        def: &EnvDefinition,
        container_name: &str,
        saved_values: Option<&HashMap<String, String>>,
    ) -> FormEnvRow {
        if let Some(saved) = saved_values.and_then(|values| values.get(&def.key)) {
            return FormEnvRow::declared(&def.key, saved.clone(), def.is_required, false);
        }

        if let Some(value) = self.overrides.get(&def.key) {
            return FormEnvRow::declared(&def.key, value.to_string(), def.is_required, true);
        }

        if self.is_container_name_key(&def.key) {
            return FormEnvRow::declared(
                &def.key,
                container_name.to_string(),
                def.is_required,
                false,
            );
        }

        FormEnvRow::declared(&def.key, String::new(), def.is_required, false)
    }

    pub fn is_container_name_key(&self, key: &str) -> bool {
        key == self.container_name_key
    }
}

/// Message shown in place of the env table when a template declares nothing.
pub fn env_notice(definitions: &[EnvDefinition]) -> Option<&'static str> {
    definitions.is_empty().then_some(NO_ENV_NOTICE)
}
