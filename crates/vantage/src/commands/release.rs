//! Release command handler.

use serde::Serialize;
use tabled::Tabled;

use vantage_core::{Adapter, Deploy, ReleaseKey, Release, WithRelease};

use crate::cli::{GlobalOpts, ReleaseArgs};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Tabled)]
struct DeployRow {
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Finished")]
    finished: String,
}

impl From<&Deploy> for DeployRow {
    fn from(d: &Deploy) -> Self {
        Self {
            environment: d.environment.clone(),
            name: util::or_dash(d.name.as_deref()).to_owned(),
            finished: d.date_finished.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// What structured formats print: the release plus whatever deploys loaded.
#[derive(Serialize)]
struct ReleaseView {
    release: Release,
    deploys: Vec<Deploy>,
}

fn detail(view: &ReleaseView, color: bool) -> String {
    let r = &view.release;
    let authors = r
        .authors
        .iter()
        .filter_map(|a| a.name.as_deref().or(a.email.as_deref()))
        .collect::<Vec<_>>()
        .join(", ");
    let projects = r
        .projects
        .iter()
        .map(|p| p.slug.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let released = r
        .date_released
        .map_or_else(|| "-".into(), |d| d.format("%Y-%m-%d %H:%M").to_string());

    let mut lines = vec![
        format!("{} {}", output::label("Version: ", color), r.version),
        format!(
            "{} {}",
            output::label("Short:   ", color),
            util::or_dash(r.short_version.as_deref())
        ),
        format!(
            "{} {}",
            output::label("Created: ", color),
            r.date_created.format("%Y-%m-%d %H:%M")
        ),
        format!("{} {released}", output::label("Released:", color)),
        format!("{} {}", output::label("Commits: ", color), r.commit_count),
        format!("{} {}", output::label("New:     ", color), r.new_groups),
        format!("{} {}", output::label("Authors: ", color), or_none(&authors)),
        format!("{} {}", output::label("Projects:", color), or_none(&projects)),
    ];

    if view.deploys.is_empty() {
        lines.push(output::dim("No deploys", color));
    } else {
        let rows: Vec<DeployRow> = view.deploys.iter().map(DeployRow::from).collect();
        lines.push(String::new());
        lines.push(output::render_table(&rows));
    }
    lines.join("\n")
}

fn or_none(joined: &str) -> &str {
    if joined.is_empty() { "-" } else { joined }
}

pub async fn handle(session: &Session, args: ReleaseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let org = session.org_key()?;
    let key = ReleaseKey::new(org.org(), &args.project, &args.version)?;

    let adapter = Adapter::new(WithRelease::new(session.api.clone(), session.stores.clone()));
    let slice = util::mount_and_settle(&adapter, key, "release", |s| !s.loading()).await?;

    let (release, stale) = util::entry_value(&slice.release, "release", &args.version, "projects")?;
    util::warn_stale(stale.as_ref(), global.quiet);

    // Deploys are secondary: a failed deploy load only warns.
    let deploys = match (slice.deploys.value(), &slice.deploys.error) {
        (Some(deploys), error) => {
            util::warn_stale(error.as_ref(), global.quiet);
            deploys.clone()
        }
        (None, Some(error)) => {
            if !global.quiet {
                eprintln!("warning: deploys unavailable: {error}");
            }
            Vec::new()
        }
        (None, None) => Vec::new(),
    };

    let view = ReleaseView { release, deploys };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| v.release.version.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
