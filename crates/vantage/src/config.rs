//! CLI configuration: thin wrapper around `vantage_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--url, --token, --org, etc.).

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use vantage_core::selection::FileStorage;
use vantage_core::{ClientConfig, StoreSettings, Stores, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use vantage_config::{
    Config, Profile, base_client_config, config_path, default_selection_dir,
    load_config_or_default, resolve_token, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names for diagnostics.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// The active profile, if configured. An explicitly requested profile
/// that does not exist is an error.
fn active_profile<'a>(
    global: &GlobalOpts,
    config: &'a Config,
) -> Result<Option<(String, &'a Profile)>, CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok(Some((name, profile))),
        None if global.profile.is_some() => Err(CliError::ProfileNotFound {
            available: available_profiles(config),
            name,
        }),
        None => Ok(None),
    }
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
///
/// Flag values take priority over profile values; the token chain is
/// `--token` / `VANTAGE_TOKEN`, then the profile's own chain.
pub fn resolve_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();

    let mut client = if let Some((name, profile)) = active_profile(global, &cfg)? {
        let mut profile = profile.clone();
        if let Some(ref url) = global.url {
            profile.url.clone_from(url);
        }
        let mut client = base_client_config(&profile, &cfg.defaults)?;
        client.token = Some(match global.token {
            Some(ref token) => SecretString::from(token.clone()),
            None => resolve_token(&profile, &name)?,
        });
        client
    } else {
        // No profile: build from flags / env vars alone
        let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {url_str}"),
        })?;
        let token = global.token.clone().ok_or_else(|| CliError::NoCredentials {
            profile: active_profile_name(global, &cfg),
        })?;

        let mut client = ClientConfig::new(url);
        client.token = Some(SecretString::from(token));
        client.timeout = Duration::from_secs(cfg.defaults.timeout);
        client.stale_after = cfg.defaults.stale_after_secs.map(Duration::from_secs);
        client.selection_dir = Some(default_selection_dir());
        if cfg.defaults.insecure {
            client.tls = TlsVerification::DangerAcceptInvalid;
        }
        client
    };

    apply_overrides(&mut client, global);
    Ok(client)
}

fn apply_overrides(client: &mut ClientConfig, global: &GlobalOpts) {
    if global.organization.is_some() {
        client.organization.clone_from(&global.organization);
    }
    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }
}

/// Stores and organization for commands that never reach the backend.
///
/// Only the selection directory and organization matter here, so neither
/// a URL nor a token is required.
pub fn resolve_offline(global: &GlobalOpts) -> Result<(Stores, String), CliError> {
    let cfg = load_config_or_default();

    let (organization, settings) = if let Some((_, profile)) = active_profile(global, &cfg)? {
        let client = base_client_config(profile, &cfg.defaults)?;
        (client.organization.clone(), client.store_settings())
    } else {
        let settings = StoreSettings {
            stale_after: None,
            selection_storage: Arc::new(FileStorage::new(default_selection_dir())),
        };
        (None, settings)
    };

    let organization = global
        .organization
        .clone()
        .or(organization)
        .ok_or(CliError::NoOrganization)?;
    Ok((Stores::new(settings), organization))
}
