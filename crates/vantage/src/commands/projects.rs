//! Project command handler.

use std::sync::Arc;

use tabled::Tabled;
use vantage_core::{Adapter, Project, WithProjects};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{Session, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Teams")]
    teams: String,
    #[tabled(rename = "Member")]
    member: String,
}

impl From<&Arc<Project>> for ProjectRow {
    fn from(p: &Arc<Project>) -> Self {
        Self {
            id: p.id.clone(),
            slug: p.slug.clone(),
            name: p.name.clone(),
            platform: util::or_dash(p.platform.as_deref()).to_owned(),
            teams: p
                .teams
                .iter()
                .map(|t| t.slug.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            member: if p.is_member { "yes" } else { "no" }.into(),
        }
    }
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let key = session.org_key()?;
    let org = key.org().to_owned();

    let adapter = Adapter::new(WithProjects::new(
        session.api.clone(),
        session.stores.clone(),
    ));
    let state = util::mount_and_settle(&adapter, key, "projects", |s| !s.loading).await?;

    if !state.loaded {
        if let Some(ref error) = state.error {
            return Err(CliError::from_load(error, "organization", &org, "config show"));
        }
    }
    util::warn_stale(state.error.as_ref(), global.quiet);

    let out = output::render_list(
        &global.output,
        state.items.as_slice(),
        |p| ProjectRow::from(p),
        |p| p.slug.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
