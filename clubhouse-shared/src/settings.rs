/// Environment-derived PostgreSQL settings
///
/// Both the API server and the migration runner build their connection URL
/// from the same `POSTGRES_*` variables, so the two never disagree about
/// which database they target.
///
/// # Environment Variables
///
/// - `POSTGRES_USER`: Database role (default: postgres)
/// - `POSTGRES_PASSWORD`: Role password (default: postgres)
/// - `POSTGRES_SERVER`: Host name (default: localhost)
/// - `POSTGRES_PORT`: Port (default: 5432)
/// - `POSTGRES_DB`: Database name (default: postgres)
/// - `POSTGRES_SCHEME`: URL scheme (default: postgres)
///
/// # Example
///
/// ```no_run
/// use clubhouse_shared::settings::PostgresSettings;
///
/// # fn example() -> Result<(), clubhouse_shared::settings::SettingsError> {
/// let settings = PostgresSettings::from_env()?;
/// println!("Connecting to {}", settings.redacted_url());
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

/// Error type for settings loading
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The environment could not be read or deserialized
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was present but unusable
    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostgresSettings {
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_server")]
    pub server: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_db")]
    pub db: String,

    /// URL scheme, `postgres` or `postgresql`
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_password() -> String {
    "postgres".to_string()
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_db() -> String {
    "postgres".to_string()
}

fn default_scheme() -> String {
    "postgres".to_string()
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            user: default_user(),
            password: default_password(),
            server: default_server(),
            port: default_port(),
            db: default_db(),
            scheme: default_scheme(),
        }
    }
}

impl PostgresSettings {
    /// Loads settings from the process environment
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_source(None)
    }

    /// Loads settings from an explicit variable map instead of the process
    /// environment. Keys use the same `POSTGRES_*` names.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        Self::from_source(Some(vars))
    }

    fn from_source(vars: Option<HashMap<String, String>>) -> Result<Self, SettingsError> {
        let settings: PostgresSettings = config::Config::builder()
            .add_source(config::Environment::with_prefix("POSTGRES").source(vars))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.scheme != "postgres" && self.scheme != "postgresql" {
            return Err(SettingsError::Invalid {
                key: "POSTGRES_SCHEME",
                reason: format!("unsupported scheme '{}'", self.scheme),
            });
        }
        if self.db.is_empty() {
            return Err(SettingsError::Invalid {
                key: "POSTGRES_DB",
                reason: "must not be empty".to_string(),
            });
        }
        self.build_url(&self.password)?;
        Ok(())
    }

    /// Full connection URL including the password
    ///
    /// User, password and database name are percent-encoded, so values
    /// containing `@`, `/` or `:` survive the round trip.
    pub fn url(&self) -> Result<String, SettingsError> {
        Ok(self.build_url(&self.password)?.into())
    }

    /// Connection URL with the password masked, for logs
    pub fn redacted_url(&self) -> String {
        match self.build_url("***") {
            Ok(url) => url.into(),
            Err(_) => format!("{}://<invalid>", self.scheme),
        }
    }

    fn build_url(&self, password: &str) -> Result<Url, SettingsError> {
        let invalid = |key: &'static str| SettingsError::Invalid {
            key,
            reason: "cannot be used in a connection URL".to_string(),
        };

        let mut url = Url::parse(&format!("{}://{}:{}", self.scheme, self.server, self.port))
            .map_err(|_| invalid("POSTGRES_SERVER"))?;
        url.set_username(&self.user)
            .map_err(|_| invalid("POSTGRES_USER"))?;
        url.set_password(Some(password))
            .map_err(|_| invalid("POSTGRES_PASSWORD"))?;
        url.path_segments_mut()
            .map_err(|_| invalid("POSTGRES_DB"))?
            .push(&self.db);

        Ok(url)
    }
}
