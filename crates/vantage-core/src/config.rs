// ── Runtime client configuration ──
//
// Describes how to reach the backend and how the stores behave. Carries
// credentials but never touches config files; the CLI builds a
// `ClientConfig` and hands it in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use vantage_api::{ApiClient, TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::selection::{FileStorage, MemoryStorage, SelectionStorage};
use crate::store::{StoreSettings, Stores};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-hosted instances with self-signed certs).
    DangerAcceptInvalid,
}

/// Everything needed to build an [`ApiClient`] and a [`Stores`] context.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://sentry.example.com/api/0/`.
    pub url: Url,
    pub token: Option<SecretString>,
    /// Default organization slug for commands that need one.
    pub organization: Option<String>,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Refetch cached values older than this. `None` keeps them forever.
    pub stale_after: Option<Duration>,
    /// Directory for last-used selections. `None` keeps them in memory.
    pub selection_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            organization: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            stale_after: None,
            selection_dir: None,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: tls_to_transport(&self.tls),
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }

    pub fn build_client(&self) -> Result<ApiClient, CoreError> {
        Ok(ApiClient::new(
            self.url.clone(),
            self.token.as_ref(),
            &self.transport(),
        )?)
    }

    pub fn store_settings(&self) -> StoreSettings {
        let selection_storage: Arc<dyn SelectionStorage> = match &self.selection_dir {
            Some(dir) => Arc::new(FileStorage::new(dir.clone())),
            None => Arc::new(MemoryStorage::new()),
        };
        StoreSettings {
            stale_after: self.stale_after,
            selection_storage,
        }
    }

    /// A fresh store context configured from this profile.
    pub fn build_stores(&self) -> Stores {
        Stores::new(self.store_settings())
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(Url::parse("https://sentry.example.com/api/0/").unwrap())
    }

    #[test]
    fn transport_follows_tls_and_timeout() {
        let mut config = config();
        config.tls = TlsVerification::DangerAcceptInvalid;
        config.timeout = Duration::from_secs(5);

        let transport = config.transport();
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn selection_dir_selects_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.selection_dir = Some(dir.path().to_path_buf());
        config.stale_after = Some(Duration::from_secs(60));

        let stores = config.build_stores();
        stores.selection().load_initial_data("acme");
        stores.selection().update_projects(vec![1]);
        stores.selection().save(crate::store::SelectionUpdate::default());

        assert!(dir.path().join("global-selection-acme.json").exists());
    }

    #[tokio::test]
    async fn builds_client_with_token() {
        let mut config = config();
        config.token = Some("tok".to_owned().into());
        let client = config.build_client().unwrap();
        assert_eq!(client.base_url().as_str(), "https://sentry.example.com/api/0/");
    }
}
