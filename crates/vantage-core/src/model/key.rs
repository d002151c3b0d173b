// ── Typed cache keys ──
//
// Every keyed store is indexed by a string built from identifying slugs.
// Building keys through these types makes a missing or malformed part a
// construction error instead of a silently shared cache slot.

use std::fmt;

use crate::error::CoreError;

/// Anything that can address a slot in a keyed store.
pub trait CacheKey {
    /// The composite string key. Parts are joined with a single space;
    /// validated parts never contain whitespace, so distinct keys never
    /// collide.
    fn cache_key(&self) -> String;
}

fn validate(field: &'static str, value: impl Into<String>) -> Result<String, CoreError> {
    let value = value.into();
    if value.is_empty() {
        return Err(CoreError::InvalidKey {
            field,
            reason: "must not be empty".into(),
        });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidKey {
            field,
            reason: format!("must not contain whitespace: {value:?}"),
        });
    }
    Ok(value)
}

// ── OrgKey ──────────────────────────────────────────────────────────

/// Organization scope (organization details, projects, teams).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrgKey {
    org: String,
}

impl OrgKey {
    pub fn new(org: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Self {
            org: validate("organization slug", org)?,
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }
}

impl CacheKey for OrgKey {
    fn cache_key(&self) -> String {
        self.org.clone()
    }
}

impl fmt::Display for OrgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.org)
    }
}

// ── ReleaseKey ──────────────────────────────────────────────────────

/// A release as seen from one project. Also keys the release's deploys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseKey {
    org: String,
    project: String,
    version: String,
}

impl ReleaseKey {
    pub fn new(
        org: impl Into<String>,
        project: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            org: validate("organization slug", org)?,
            project: validate("project slug", project)?,
            version: validate("release version", version)?,
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl CacheKey for ReleaseKey {
    fn cache_key(&self) -> String {
        format!("{} {} {}", self.org, self.project, self.version)
    }
}

impl fmt::Display for ReleaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.org, self.project, self.version)
    }
}

// ── AttachmentKey ───────────────────────────────────────────────────

/// The attachments of one event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentKey {
    org: String,
    project: String,
    event_id: String,
}

impl AttachmentKey {
    pub fn new(
        org: impl Into<String>,
        project: impl Into<String>,
        event_id: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            org: validate("organization slug", org)?,
            project: validate("project slug", project)?,
            event_id: validate("event id", event_id)?,
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}

impl CacheKey for AttachmentKey {
    fn cache_key(&self) -> String {
        format!("{} {} {}", self.org, self.project, self.event_id)
    }
}

impl fmt::Display for AttachmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.org, self.project, self.event_id)
    }
}
