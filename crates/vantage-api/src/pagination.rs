// Link-header pagination
//
// List endpoints answer with a `Link` header carrying a `previous` and a
// `next` link, each annotated with `results="true|false"` and an opaque
// `cursor`. A link with `results="false"` points at an empty page.

use std::collections::HashSet;

use tracing::warn;

/// One `<href>; rel=...; results=...; cursor=...` entry of a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub href: String,
    pub results: bool,
    pub cursor: String,
}

/// The `previous` / `next` links of a paginated response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
}

/// A single page of a listing plus the cursors needed to move around.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the next page, `None` when there are no more results.
    pub next: Option<String>,
    /// Cursor of the previous page, `None` on the first page.
    pub previous: Option<String>,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, links: &PageLinks) -> Self {
        let cursor_of = |link: &Option<PageLink>| {
            link.as_ref()
                .filter(|l| l.results)
                .map(|l| l.cursor.clone())
        };
        Self {
            items,
            next: cursor_of(&links.next),
            previous: cursor_of(&links.previous),
        }
    }
}

/// Cursors already followed while walking a listing to its end.
#[derive(Debug, Default)]
pub(crate) struct CursorTrail {
    seen: HashSet<String>,
}

impl CursorTrail {
    /// The cursor to request next. `None` when the listing is exhausted or
    /// the backend hands out a cursor that was already followed.
    pub(crate) fn advance(&mut self, next: Option<String>) -> Option<String> {
        let next = next?;
        if self.seen.insert(next.clone()) {
            Some(next)
        } else {
            warn!(cursor = %next, "pagination cursor repeated, stopping");
            None
        }
    }
}

/// Parse a `Link` header. Unknown `rel` values and malformed entries are skipped.
pub fn parse_link_header(header: &str) -> PageLinks {
    let mut links = PageLinks::default();

    for entry in header.split(',') {
        let mut parts = entry.split(';').map(str::trim);
        let Some(href) = parts
            .next()
            .and_then(|h| h.strip_prefix('<'))
            .and_then(|h| h.strip_suffix('>'))
        else {
            continue;
        };

        let mut rel = None;
        let mut results = false;
        let mut cursor = None;
        for attr in parts {
            let Some((name, value)) = attr.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match name.trim() {
                "rel" => rel = Some(value.to_owned()),
                "results" => results = value == "true",
                "cursor" => cursor = Some(value.to_owned()),
                _ => {}
            }
        }

        let link = PageLink {
            href: href.to_owned(),
            results,
            cursor: cursor.unwrap_or_default(),
        };
        match rel.as_deref() {
            Some("previous") => links.previous = Some(link),
            Some("next") => links.next = Some(link),
            _ => {}
        }
    }

    links
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const HEADER: &str = "<https://monitor.example.com/api/0/organizations/acme/projects/?&cursor=0:0:1>; \
        rel=\"previous\"; results=\"false\"; cursor=\"0:0:1\", \
        <https://monitor.example.com/api/0/organizations/acme/projects/?&cursor=0:100:0>; \
        rel=\"next\"; results=\"true\"; cursor=\"0:100:0\"";

    #[test]
    fn parses_previous_and_next() {
        let links = parse_link_header(HEADER);

        let previous = links.previous.clone().unwrap();
        assert!(!previous.results);
        assert_eq!(previous.cursor, "0:0:1");

        let next = links.next.clone().unwrap();
        assert!(next.results);
        assert_eq!(next.cursor, "0:100:0");
        assert!(next.href.ends_with("cursor=0:100:0"));
    }

    #[test]
    fn page_only_exposes_cursors_with_results() {
        let page = Page::new(vec![1, 2, 3], &parse_link_header(HEADER));
        assert_eq!(page.next.as_deref(), Some("0:100:0"));
        assert_eq!(page.previous, None);
    }

    #[test]
    fn cursor_trail_stops_on_repeat() {
        let mut trail = CursorTrail::default();
        assert_eq!(trail.advance(Some("0:1:0".into())).as_deref(), Some("0:1:0"));
        assert_eq!(trail.advance(Some("0:2:0".into())).as_deref(), Some("0:2:0"));
        assert_eq!(trail.advance(Some("0:1:0".into())), None);
        assert_eq!(trail.advance(None), None);
    }

    #[test]
    fn garbage_header_yields_no_links() {
        assert_eq!(parse_link_header("nonsense, ;;"), PageLinks::default());
    }
}
