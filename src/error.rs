use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Public ports already in use: {}", join_ports(.0))]
    PortConflict(Vec<u16>),

    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Environment variable '{0}' is set globally and cannot be edited")]
    LockedVariable(String),

    #[error("Environment variable '{0}' is already defined")]
    DuplicateKey(String),

    #[error("Form row {0} not found")]
    RowNotFound(Uuid),

    #[error("Failed to load {resource}: {reason}")]
    Load { resource: String, reason: String },

    #[error("Container '{0}' not found")]
    ContainerNotFound(String),

    #[error("Form session is closed")]
    SessionClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    SerdeError(String),
}

impl ConsoleError {
    pub fn load(resource: &str, reason: impl ToString) -> Self {
        ConsoleError::Load {
            resource: resource.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short message for the transient notification shown to the operator.
    /// Internal-consistency failures are reported generically.
    pub fn notification(&self) -> String {
        match self {
            ConsoleError::TemplateNotFound(_) => {
                "The selected template is no longer available".to_string()
            }
            ConsoleError::RowNotFound(_) | ConsoleError::SessionClosed => {
                "Unexpected error, please reopen the form".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether the editing session has to be closed after this error.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            ConsoleError::TemplateNotFound(_) | ConsoleError::ContainerNotFound(_)
        )
    }
}

fn join_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(|port| port.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<toml::de::Error> for ConsoleError {
    fn from(err: toml::de::Error) -> Self {
        ConsoleError::SerdeError(err.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::SerdeError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_every_offender() {
        let missing = ConsoleError::MissingRequired(vec!["API_TOKEN".into(), "DB_HOST".into()]);
        assert_eq!(
            missing.to_string(),
            "Missing required environment variables: API_TOKEN, DB_HOST"
        );

        let ports = ConsoleError::PortConflict(vec![8080, 5432]);
        assert_eq!(ports.to_string(), "Public ports already in use: 8080, 5432");
    }

    #[test]
    fn template_not_found_is_generic_and_fatal() {
        let err = ConsoleError::TemplateNotFound("42".into());
        assert!(err.is_fatal_to_session());
        assert!(!err.notification().contains("42"));
        assert!(!ConsoleError::PortConflict(vec![80]).is_fatal_to_session());
    }

    #[test]
    fn duplicate_key_names_the_key() {
        let err = ConsoleError::DuplicateKey("TZ".into());
        assert_eq!(err.notification(), "Environment variable 'TZ' is already defined");
        assert!(!err.is_fatal_to_session());
    }
}
