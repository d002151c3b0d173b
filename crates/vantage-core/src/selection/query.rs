use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;
use url::Url;

use super::{DEFAULT_STATS_PERIOD, DateTimeSelection};

/// Selection-related parameters read from a URL query string.
///
/// `project` and `environment` are `None` when the key is absent and
/// `Some` (possibly empty) when present, so callers can tell "not in the
/// URL" from "explicitly cleared".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionQuery {
    pub project: Option<Vec<i64>>,
    pub environment: Option<Vec<String>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub period: Option<String>,
    pub utc: Option<bool>,
    pub cursor: Option<String>,
}

impl SelectionQuery {
    /// Parse decoded key/value pairs. Unknown keys and malformed values are
    /// ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        let mut stats_period = None;
        let mut period = None;

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "project" => {
                    let projects = query.project.get_or_insert_with(Vec::new);
                    match value.parse::<i64>() {
                        Ok(id) => projects.push(id),
                        Err(_) => debug!(value, "ignoring non-numeric project id"),
                    }
                }
                "environment" => {
                    let envs = query.environment.get_or_insert_with(Vec::new);
                    if !value.is_empty() {
                        envs.push(value.to_owned());
                    }
                }
                "start" => query.start = parse_date(value),
                "end" => query.end = parse_date(value),
                "statsPeriod" => stats_period = Some(value.to_owned()),
                "period" => period = Some(value.to_owned()),
                "utc" => query.utc = parse_bool(value),
                "cursor" if !value.is_empty() => query.cursor = Some(value.to_owned()),
                _ => {}
            }
        }

        query.period = stats_period
            .into_iter()
            .chain(period)
            .find(|p| is_valid_period(p));
        query
    }

    /// Parse a raw query string (`project=1&statsPeriod=24h`), with or
    /// without the leading `?`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self::from_pairs(url::form_urlencoded::parse(raw.as_bytes()))
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// Whether the URL names projects or environments explicitly.
    pub fn has_project_or_environment(&self) -> bool {
        self.project.is_some() || self.environment.is_some()
    }

    /// Whether the URL carries any time information.
    pub fn has_datetime(&self) -> bool {
        self.start.is_some() || self.end.is_some() || self.period.is_some()
    }

    /// Normalized time window: a complete absolute range clears the
    /// period; otherwise a valid period is used, falling back to the
    /// default.
    pub fn datetime(&self) -> DateTimeSelection {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            return DateTimeSelection {
                utc: self.utc,
                ..DateTimeSelection::absolute(start, end)
            };
        }
        DateTimeSelection {
            utc: self.utc,
            ..DateTimeSelection::relative(
                self.period.as_deref().unwrap_or(DEFAULT_STATS_PERIOD),
            )
        }
    }
}

/// `<n><unit>` with unit one of `s`, `m`, `h`, `d`, `w`.
pub fn is_valid_period(period: &str) -> bool {
    let Some(unit) = period.chars().last() else {
        return false;
    };
    let digits = &period[..period.len() - unit.len_utf8()];
    matches!(unit, 's' | 'm' | 'h' | 'd' | 'w')
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_repeated_projects_and_environments() {
        let query = SelectionQuery::parse("?project=1&project=abc&project=3&environment=prod&environment=staging");
        assert_eq!(query.project, Some(vec![1, 3]));
        assert_eq!(
            query.environment,
            Some(vec!["prod".to_owned(), "staging".to_owned()])
        );
        assert!(query.has_project_or_environment());
    }

    #[test]
    fn empty_query_defaults_to_fourteen_days() {
        let query = SelectionQuery::parse("");
        assert!(!query.has_project_or_environment());
        assert!(!query.has_datetime());
        assert_eq!(query.datetime(), DateTimeSelection::relative("14d"));
    }

    #[test]
    fn stats_period_wins_over_period_and_invalid_is_dropped() {
        assert_eq!(
            SelectionQuery::parse("statsPeriod=24h&period=7d").period.as_deref(),
            Some("24h")
        );
        assert_eq!(
            SelectionQuery::parse("statsPeriod=bogus&period=7d").period.as_deref(),
            Some("7d")
        );
        assert_eq!(SelectionQuery::parse("statsPeriod=h").period, None);
    }

    #[test]
    fn absolute_range_clears_period() {
        let query = SelectionQuery::parse(
            "start=2020-05-01T00:00:00&end=2020-05-02T00:00:00Z&statsPeriod=24h&utc=true",
        );
        let dt = query.datetime();
        assert_eq!(dt.start, Some(Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap()));
        assert_eq!(dt.end, Some(Utc.with_ymd_and_hms(2020, 5, 2, 0, 0, 0).unwrap()));
        assert_eq!(dt.period, None);
        assert_eq!(dt.utc, Some(true));
    }

    #[test]
    fn incomplete_range_falls_back_to_period() {
        let dt = SelectionQuery::parse("start=2020-05-01T00:00:00").datetime();
        assert_eq!(dt, DateTimeSelection::relative("14d"));
    }

    #[test]
    fn from_url_reads_cursor() {
        let url = Url::parse("https://example.com/organizations/acme/issues/?cursor=0:100:0&project=2").unwrap();
        let query = SelectionQuery::from_url(&url);
        assert_eq!(query.cursor.as_deref(), Some("0:100:0"));
        assert_eq!(query.project, Some(vec![2]));
    }

    #[test]
    fn period_validation() {
        assert!(is_valid_period("90d"));
        assert!(is_valid_period("1w"));
        assert!(!is_valid_period("d"));
        assert!(!is_valid_period("10y"));
        assert!(!is_valid_period(""));
    }
}
