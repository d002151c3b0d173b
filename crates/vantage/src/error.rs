//! CLI error types with miette diagnostics.
//!
//! Maps load failures, `CoreError` and `ConfigError` into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use vantage_config::ConfigError;
use vantage_core::{CoreError, LoadError, LoadErrorKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the backend: {reason}")]
    #[diagnostic(
        code(vantage::connection_failed),
        help(
            "Check the API root URL and your network.\n\
             Self-hosted with a private CA? Set ca_cert in your profile or pass --insecure (-k)."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(vantage::auth_failed),
        help(
            "Verify the token has the required scopes.\n\
             Run: vantage config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(vantage::no_credentials),
        help(
            "Configure a token with: vantage config init\n\
             Or set the VANTAGE_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(vantage::not_found),
        help("Run: vantage {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No organization selected")]
    #[diagnostic(
        code(vantage::no_organization),
        help("Pass --org <slug>, set VANTAGE_ORG, or run: vantage config set organization <slug>")
    )]
    NoOrganization,

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(vantage::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    #[error("{resource_type} did not finish loading")]
    #[diagnostic(code(vantage::incomplete))]
    Incomplete { resource_type: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vantage::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vantage::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: vantage config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(vantage::no_config),
        help(
            "Create one with: vantage config init\n\
             Expected at: {path}\n\
             Or pass --url and --token directly."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(vantage::config))]
    Config { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(vantage::keyring),
        help("No keyring available? Set token_env on the profile instead.")
    )]
    Keyring { message: String },

    // ── Core ─────────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(vantage::core))]
    Core(#[from] CoreError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(vantage::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(vantage::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::Keyring { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NoOrganization
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a load failure recorded on a cache entry.
    pub fn from_load(
        err: &LoadError,
        resource_type: &str,
        identifier: &str,
        list_command: &str,
    ) -> Self {
        match err.kind {
            LoadErrorKind::Network => Self::ConnectionFailed {
                reason: err.message.clone(),
            },
            LoadErrorKind::Authentication => Self::AuthFailed {
                message: err.message.clone(),
            },
            LoadErrorKind::Application if err.status == Some(404) => Self::NotFound {
                resource_type: resource_type.into(),
                identifier: identifier.into(),
                list_command: list_command.into(),
            },
            LoadErrorKind::Application | LoadErrorKind::Decode => Self::ApiError {
                status: err.status,
                message: err.message.clone(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(see: vantage config profiles)".into(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Keyring(message) => Self::Keyring { message },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_map_to_exit_codes() {
        let not_found = LoadError::new(LoadErrorKind::Application, "HTTP 404: Not found")
            .with_status(404);
        let err = CliError::from_load(&not_found, "release", "1.0.0", "projects");
        assert!(matches!(err, CliError::NotFound { .. }));
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);

        let network = LoadError::new(LoadErrorKind::Network, "connection refused");
        assert_eq!(
            CliError::from_load(&network, "release", "1.0.0", "projects").exit_code(),
            exit_code::CONNECTION
        );

        let server = LoadError::new(LoadErrorKind::Application, "HTTP 500").with_status(500);
        assert_eq!(
            CliError::from_load(&server, "release", "1.0.0", "projects").exit_code(),
            exit_code::GENERAL
        );
    }

    #[test]
    fn config_errors_keep_their_meaning() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "work".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from(ConfigError::UnknownProfile {
            name: "nope".into(),
        });
        assert!(matches!(err, CliError::ProfileNotFound { ref name, .. } if name == "nope"));
    }
}
