//! Shared helpers for command handlers.

use tracing::debug;

use vantage_core::{Adapter, Binding, CacheEntry, LoadError};

use crate::error::CliError;

/// Mount `adapter` on `key` and wait until `settled` holds for its props.
///
/// Fetches are spawned by the mount itself; the props stream reports
/// every store change for the key until it settles.
pub async fn mount_and_settle<B: Binding>(
    adapter: &Adapter<B>,
    key: B::Key,
    resource_type: &str,
    settled: impl FnMut(&B::Props) -> bool,
) -> Result<B::Props, CliError> {
    let handles = adapter.mount(key);
    debug!(resource_type, requests = handles.len(), "adapter mounted");

    let mut props = adapter.stream();
    let result = props.wait_for(settled).await;
    adapter.unmount();

    result.ok_or_else(|| CliError::Incomplete {
        resource_type: resource_type.into(),
    })
}

/// The value of a settled entry, or its error translated for the CLI.
///
/// A stale value is still returned alongside an error; the caller
/// decides whether to warn.
pub fn entry_value<V: Clone>(
    entry: &CacheEntry<V>,
    resource_type: &str,
    identifier: &str,
    list_command: &str,
) -> Result<(V, Option<LoadError>), CliError> {
    match (entry.value(), &entry.error) {
        (Some(value), error) => Ok((value.clone(), error.clone())),
        (None, Some(error)) => Err(CliError::from_load(
            error,
            resource_type,
            identifier,
            list_command,
        )),
        (None, None) => Err(CliError::Incomplete {
            resource_type: resource_type.into(),
        }),
    }
}

/// Note a refresh failure when stale data is shown anyway.
pub fn warn_stale(error: Option<&LoadError>, quiet: bool) {
    if let Some(error) = error {
        if !quiet {
            eprintln!("warning: showing cached data, refresh failed: {error}");
        }
    }
}

/// Format an optional value for detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
