// Wire models for the REST API.
//
// The backend speaks camelCase JSON. Optional or late-added fields carry
// `#[serde(default)]` so older servers still decode.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Minimal team reference embedded in other payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default = "default_true")]
    pub has_access: bool,
    #[serde(default)]
    pub teams: Vec<TeamRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub member_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseProject {
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub version: String,
    #[serde(default)]
    pub short_version: Option<String>,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub date_released: Option<DateTime<Utc>>,
    #[serde(default)]
    pub new_groups: u64,
    #[serde(default)]
    pub commit_count: u64,
    #[serde(default)]
    pub authors: Vec<ReleaseAuthor>,
    #[serde(default)]
    pub projects: Vec<ReleaseProject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deploy {
    pub id: String,
    pub environment: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date_started: Option<DateTime<Utc>>,
    pub date_finished: DateTime<Utc>,
}

/// File attached to an event (minidump, log, screenshot, ...).
///
/// This endpoint is snake_case for `event_id`, unlike the rest of the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttachment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub size: u64,
    #[serde(default)]
    pub sha1: Option<String>,
    pub date_created: DateTime<Utc>,
    #[serde(rename = "event_id")]
    pub event_id: String,
    #[serde(rename = "type")]
    pub attachment_type: String,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn project_defaults_missing_flags() {
        let project: Project = serde_json::from_value(json!({
            "id": "2",
            "slug": "web",
        }))
        .unwrap();
        assert!(project.has_access);
        assert!(!project.is_bookmarked);
        assert!(project.teams.is_empty());
    }

    #[test]
    fn attachment_keeps_snake_case_event_id() {
        let attachment: EventAttachment = serde_json::from_value(json!({
            "id": "12",
            "name": "minidump.dmp",
            "size": 2048,
            "dateCreated": "2020-06-01T12:00:00Z",
            "event_id": "abcdef",
            "type": "event.minidump",
        }))
        .unwrap();
        assert_eq!(attachment.event_id, "abcdef");
        assert_eq!(attachment.attachment_type, "event.minidump");
    }
}
