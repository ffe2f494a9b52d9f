use crate::session::FormSession;
use crate::{ConsoleError, Result, log_debug, log_warn};

/// Raw field values as typed on the command line, applied to a session in
/// the order an operator would fill the form.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    /// `KEY=VALUE`
    pub env: Vec<String>,
    /// `PUBLIC:PRIVATE`
    pub ports: Vec<String>,
    /// `NAME:CONTAINER_PATH`
    pub volumes: Vec<String>,
    pub network: Option<String>,
    pub ip: Option<String>,
}

pub fn split_pair<'a>(input: &'a str, separator: char, shape: &str) -> Result<(&'a str, &'a str)> {
    input
        .split_once(separator)
        .ok_or_else(|| ConsoleError::ConfigError(format!("expected {}, got '{}'", shape, input)))
}

/// Name, template selection and optional default rows for a new container,
/// followed by the remaining fields.
pub fn fill_new(
    session: &mut FormSession,
    template_id: &str,
    name: &str,
    defaults: bool,
    fields: &FormFields,
) -> Result<()> {
    session.set_name(name)?;
    session.select_template(template_id)?;
    if defaults {
        session.apply_template_defaults()?;
    }
    apply_fields(session, fields)
}

/// Env values land on the row holding the key, or on a new free-form row.
/// Values aimed at global rows are skipped with a warning.
pub fn apply_fields(session: &mut FormSession, fields: &FormFields) -> Result<()> {
    for pair in &fields.env {
        let (key, value) = split_pair(pair, '=', "KEY=VALUE")?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConsoleError::ConfigError(format!("empty key in '{}'", pair)));
        }
        let existing = session
            .form()
            .env_rows()
            .iter()
            .find(|row| row.key.trim() == key)
            .map(|row| row.id);
        let form = session.form_mut()?;
        let row_id = match existing {
            Some(id) => id,
            None => {
                log_debug!("Adding free-form variable {}", key);
                let id = form.add_env_row();
                form.set_env_key(id, key)?;
                id
            }
        };
        if let Err(err) = form.set_env_value(row_id, value) {
            log_warn!("{}", err);
        }
    }

    for mapping in &fields.ports {
        let (public, private) = split_pair(mapping, ':', "PUBLIC:PRIVATE")?;
        let form = session.form_mut()?;
        let row_id = form.add_port_row();
        form.set_port_row(row_id, private, public)?;
    }

    for mapping in &fields.volumes {
        let (name, path) = split_pair(mapping, ':', "NAME:CONTAINER_PATH")?;
        let form = session.form_mut()?;
        let row_id = form.add_volume_row();
        form.set_volume_row(row_id, name, path)?;
    }

    let form = session.form_mut()?;
    if let Some(network) = &fields.network {
        form.set_network_name(network);
    }
    if let Some(ip) = &fields.ip {
        form.set_network_ip(ip);
    }
    Ok(())
}

/// Submits the session and returns the accepted payload as pretty JSON.
pub fn submit_json(session: &mut FormSession) -> Result<String> {
    let mut accepted = None;
    session.submit(|payload| accepted = Some(payload))?;
    let payload = accepted.ok_or(ConsoleError::SessionClosed)?;
    Ok(serde_json::to_string_pretty(&payload)?)
}
