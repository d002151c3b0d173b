//! Global selection command handlers.
//!
//! These run against the stores alone: the selection is seeded from the
//! query and the last-used record of the organization, never from the
//! backend.

use serde::Serialize;
use url::Url;

use vantage_core::{
    Adapter, GlobalSelection, SelectionQuery, SelectionUpdate, Stores, WithGlobalSelection,
};

use crate::cli::{GlobalOpts, SelectionArgs, SelectionCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Selection plus the query string that reproduces it.
#[derive(Serialize)]
struct SelectionView {
    organization: String,
    #[serde(flatten)]
    selection: GlobalSelection,
    query: String,
}

impl SelectionView {
    fn new(organization: String, selection: GlobalSelection) -> Self {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(selection.to_query())
            .finish();
        Self {
            organization,
            selection,
            query,
        }
    }
}

fn detail(view: &SelectionView, color: bool) -> String {
    let s = &view.selection;
    let projects = if s.projects.is_empty() {
        "(my projects)".to_owned()
    } else if s.projects == [-1] {
        "(all projects)".to_owned()
    } else {
        s.projects
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let environments = if s.environments.is_empty() {
        "(all)".to_owned()
    } else {
        s.environments.join(", ")
    };
    let window = match (&s.datetime.start, &s.datetime.end, &s.datetime.period) {
        (Some(start), Some(end), _) => format!("{start} .. {end}"),
        (_, _, Some(period)) => format!("last {period}"),
        _ => "-".to_owned(),
    };

    [
        format!("{} {}", output::label("Organization:", color), view.organization),
        format!("{} {projects}", output::label("Projects:    ", color)),
        format!("{} {environments}", output::label("Environments:", color)),
        format!("{} {window}", output::label("Window:      ", color)),
        format!("{} ?{}", output::label("Query:       ", color), view.query),
    ]
    .join("\n")
}

/// A full URL or a bare query string, with or without a leading `?`.
fn parse_query(raw: &str) -> SelectionQuery {
    match Url::parse(raw) {
        Ok(url) => SelectionQuery::from_url(&url),
        Err(_) => SelectionQuery::parse(raw.trim_start_matches('?')),
    }
}

/// Seed the selection for `org` and read it back through an adapter.
fn seed(
    stores: &Stores,
    org: &str,
    query: &SelectionQuery,
    skip_last_used: bool,
) -> Result<GlobalSelection, CliError> {
    let adapter = Adapter::new(WithGlobalSelection::new(stores.clone()));
    let _ = adapter.mount(());

    stores
        .selection()
        .initialize_url_state(org, query, skip_last_used);
    stores.selection().load_initial_data(org);

    let state = adapter.props();
    adapter.unmount();
    if !state.is_ready {
        return Err(CliError::Incomplete {
            resource_type: "selection".into(),
        });
    }
    Ok(state.selection)
}

pub fn handle(args: SelectionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (stores, org) = config::resolve_offline(global)?;

    let selection = match args.command {
        SelectionCommand::Parse {
            query,
            skip_last_used,
        } => seed(&stores, &org, &parse_query(&query), skip_last_used)?,

        SelectionCommand::Show => seed(&stores, &org, &SelectionQuery::default(), false)?,

        SelectionCommand::Save {
            projects,
            environments,
        } => {
            seed(&stores, &org, &SelectionQuery::default(), false)?;
            let update = SelectionUpdate {
                projects: (!projects.is_empty()).then_some(projects),
                environments: (!environments.is_empty()).then_some(environments),
            };
            if let Some(ref p) = update.projects {
                stores.selection().update_projects(p.clone());
            }
            if let Some(ref e) = update.environments {
                stores.selection().update_environments(e.clone());
            }
            stores.selection().save(update);
            if !global.quiet {
                eprintln!("✓ Saved last-used selection for '{org}'");
            }
            stores.selection().get().selection
        }
    };

    let view = SelectionView::new(org, selection);
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| v.query.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_urls_and_bare_queries() {
        let from_url = parse_query("https://sentry.example.com/organizations/acme/issues/?project=2");
        let bare = parse_query("?project=2");
        assert_eq!(from_url.project, Some(vec![2]));
        assert_eq!(from_url, bare);
    }

    #[test]
    fn view_carries_round_trippable_query() {
        let selection = GlobalSelection {
            projects: vec![1, 2],
            environments: vec!["prod".into()],
            ..GlobalSelection::default()
        };
        let view = SelectionView::new("acme".into(), selection.clone());
        assert_eq!(view.query, "project=1&project=2&environment=prod&statsPeriod=14d");

        let reparsed = SelectionQuery::parse(&view.query);
        assert_eq!(reparsed.project, Some(selection.projects));
    }
}
