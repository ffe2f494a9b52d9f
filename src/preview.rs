//! Connection-string preview for common database and cache images.
//!
//! Best-effort: the family is guessed from the image reference and the
//! credentials from env key names. The output is a convenience for the
//! operator, not a provisioning contract.

use crate::config::PreviewConfig;
use crate::form::{FormEnvRow, FormPortMapping};
use crate::ports::parse_port;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseFamily {
    Postgres,
    Mysql,
    Mongodb,
    Redis,
}

impl DatabaseFamily {
    /// Case-insensitive substring match, tested in declaration order.
    pub fn detect(image: &str) -> Option<Self> {
        let image = image.to_lowercase();
        if image.contains("postgres") {
            Some(Self::Postgres)
        } else if image.contains("mysql") || image.contains("mariadb") {
            Some(Self::Mysql)
        } else if image.contains("mongo") {
            Some(Self::Mongodb)
        } else if image.contains("redis") {
            Some(Self::Redis)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Postgres => "PostgreSQL",
            Self::Mysql => "MySQL / MariaDB",
            Self::Mongodb => "MongoDB",
            Self::Redis => "Redis",
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::Mysql => "mysql",
            Self::Mongodb => "mongodb",
            Self::Redis => "redis",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Mysql => 3306,
            Self::Mongodb => 27017,
            Self::Redis => 6379,
        }
    }

    /// Administrative account assumed when no custom user/password pair is set.
    pub fn superuser(&self) -> Option<&'static str> {
        match self {
            Self::Postgres => Some("postgres"),
            Self::Mysql | Self::Mongodb => Some("root"),
            Self::Redis => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPreview {
    pub family: DatabaseFamily,
    pub label: &'static str,
    pub public_url: String,
    pub private_url: String,
}

/// The slice of form state the preview depends on.
#[derive(Debug, Clone, Copy)]
pub struct PreviewInput<'a> {
    pub image: &'a str,
    pub env: &'a [FormEnvRow],
    pub ports: &'a [FormPortMapping],
    pub network_ip: &'a str,
    pub container_name: &'a str,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Credentials<'a> {
    user: Option<&'a str>,
    password: Option<&'a str>,
}

pub fn derive_preview(input: &PreviewInput<'_>, config: &PreviewConfig) -> Option<ConnectionPreview> {
    let family = DatabaseFamily::detect(input.image)?;

    let private_port = family.default_port();
    let public_port = mapped_public_port(input.ports, private_port).unwrap_or(private_port);

    let credentials = resolve_credentials(family, input.env);
    let path = database_path(family, input.env, config);

    let public_host = non_empty(input.network_ip).unwrap_or(&config.public_host_fallback);
    let private_host = non_empty(input.container_name).unwrap_or(&config.private_host_fallback);

    Some(ConnectionPreview {
        family,
        label: family.label(),
        public_url: build_url(family.scheme(), &credentials, public_host, public_port, path.as_deref()),
        private_url: build_url(family.scheme(), &credentials, private_host, private_port, path.as_deref()),
    })
}

/// Public port of the first row exposing `private_port` with a usable public
/// port. Rows with a blank or non-numeric public port are skipped, so a
/// seeded default row never hides a later real mapping.
fn mapped_public_port(ports: &[FormPortMapping], private_port: u16) -> Option<u16> {
    ports.iter().find_map(|row| {
        (parse_port(&row.private_port) == Some(private_port))
            .then(|| parse_port(&row.public_port))
            .flatten()
    })
}

/// First row, in declared order, whose lowercased key satisfies `matches`.
fn find_value<'a>(env: &'a [FormEnvRow], matches: impl Fn(&str) -> bool) -> Option<&'a str> {
    env.iter()
        .find(|row| matches(&row.key.to_lowercase()))
        .map(|row| row.value.as_str())
}

fn resolve_credentials(family: DatabaseFamily, env: &[FormEnvRow]) -> Credentials<'_> {
    let Some(superuser) = family.superuser() else {
        let password = find_value(env, |key| {
            key.contains("password") || key.contains("requirepass")
        });
        return Credentials {
            user: None,
            password: password.and_then(non_empty),
        };
    };

    let custom_user = find_value(env, |key| key.contains("user")).and_then(non_empty);
    let custom_password = find_value(env, |key| key.contains("password") && !key.contains("root"))
        .and_then(non_empty);

    if let (Some(user), Some(password)) = (custom_user, custom_password) {
        return Credentials {
            user: Some(user),
            password: Some(password),
        };
    }

    let password = find_value(env, |key| key.contains("root") && key.contains("password"))
        .or_else(|| find_value(env, |key| key.contains("password")));

    Credentials {
        user: Some(superuser),
        password: password.and_then(non_empty),
    }
}

fn database_path(family: DatabaseFamily, env: &[FormEnvRow], config: &PreviewConfig) -> Option<String> {
    match family {
        DatabaseFamily::Postgres => Some(
            find_value(env, |key| key.contains("db") || key.contains("database"))
                .and_then(non_empty)
                .unwrap_or(&config.postgres_default_database)
                .to_string(),
        ),
        DatabaseFamily::Mysql => find_value(env, |key| key.contains("database"))
            .and_then(non_empty)
            .map(str::to_string),
        DatabaseFamily::Mongodb | DatabaseFamily::Redis => None,
    }
}

fn build_url(
    scheme: &str,
    credentials: &Credentials<'_>,
    host: &str,
    port: u16,
    path: Option<&str>,
) -> String {
    let auth = match (credentials.user, credentials.password) {
        (Some(user), Some(password)) => format!("{}:{}@", user, password),
        (Some(user), None) => format!("{}@", user),
        (None, Some(password)) => format!(":{}@", password),
        (None, None) => String::new(),
    };

    let path = path
        .filter(|p| !p.is_empty())
        .map(|p| format!("/{}", p))
        .unwrap_or_default();

    format!("{}://{}{}:{}{}", scheme, auth, host, port, path)
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
