// ── Global selection ──
//
// The projects, environments and time window every view scopes its
// queries by. Initialized from URL query parameters and/or the last-used
// selection persisted per organization.

mod query;
mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use query::{SelectionQuery, is_valid_period, parse_date};
pub use storage::{FileStorage, MemoryStorage, SelectionStorage, StoredSelection};

/// Relative window used when neither an absolute range nor a period is given.
pub const DEFAULT_STATS_PERIOD: &str = "14d";

/// Date format written back to URLs (UTC, no offset).
pub(crate) const URL_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Absolute range or relative period. A complete absolute range wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeSelection {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub period: Option<String>,
    pub utc: Option<bool>,
}

impl DateTimeSelection {
    /// A relative window such as `24h` or `14d`.
    pub fn relative(period: impl Into<String>) -> Self {
        Self {
            start: None,
            end: None,
            period: Some(period.into()),
            utc: None,
        }
    }

    pub fn absolute(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            period: None,
            utc: None,
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

impl Default for DateTimeSelection {
    fn default() -> Self {
        Self::relative(DEFAULT_STATS_PERIOD)
    }
}

/// Projects, environments and time window shared by every view.
///
/// An empty `projects` list means "my projects"; `[-1]` means all projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSelection {
    pub projects: Vec<i64>,
    pub environments: Vec<String>,
    pub datetime: DateTimeSelection,
}

impl GlobalSelection {
    /// Query pairs (`project`, `environment`, `start`, `end`, `statsPeriod`,
    /// `utc`) that [`SelectionQuery`] parses back into this selection.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .projects
            .iter()
            .map(|p| ("project".to_owned(), p.to_string()))
            .collect();
        pairs.extend(
            self.environments
                .iter()
                .map(|e| ("environment".to_owned(), e.clone())),
        );

        let dt = &self.datetime;
        if let Some(start) = dt.start {
            pairs.push(("start".into(), start.format(URL_DATE_FORMAT).to_string()));
        }
        if let Some(end) = dt.end {
            pairs.push(("end".into(), end.format(URL_DATE_FORMAT).to_string()));
        }
        if let Some(period) = &dt.period {
            pairs.push(("statsPeriod".into(), period.clone()));
        }
        if let Some(utc) = dt.utc {
            pairs.push(("utc".into(), utc.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_selection_is_fourteen_days() {
        let selection = GlobalSelection::default();
        assert!(selection.projects.is_empty());
        assert_eq!(selection.datetime.period.as_deref(), Some("14d"));
        assert!(!selection.datetime.is_absolute());
    }

    #[test]
    fn to_query_writes_repeated_keys_and_dates() {
        let selection = GlobalSelection {
            projects: vec![1, 2],
            environments: vec!["prod".into()],
            datetime: DateTimeSelection {
                utc: Some(true),
                ..DateTimeSelection::absolute(
                    Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2020, 5, 2, 12, 30, 0).unwrap(),
                )
            },
        };

        assert_eq!(
            selection.to_query(),
            vec![
                ("project".to_owned(), "1".to_owned()),
                ("project".to_owned(), "2".to_owned()),
                ("environment".to_owned(), "prod".to_owned()),
                ("start".to_owned(), "2020-05-01T00:00:00".to_owned()),
                ("end".to_owned(), "2020-05-02T12:30:00".to_owned()),
                ("utc".to_owned(), "true".to_owned()),
            ]
        );

        let parsed = SelectionQuery::from_pairs(selection.to_query());
        assert_eq!(parsed.datetime(), selection.datetime);
        assert_eq!(parsed.project, Some(vec![1, 2]));
    }
}
