//! Team command handler.

use std::sync::Arc;

use tabled::Tabled;
use vantage_core::{Adapter, Team, WithTeams};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Tabled)]
struct TeamRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Members")]
    members: String,
    #[tabled(rename = "Joined")]
    joined: String,
}

impl From<&Arc<Team>> for TeamRow {
    fn from(t: &Arc<Team>) -> Self {
        Self {
            id: t.id.clone(),
            slug: t.slug.clone(),
            name: t.name.clone(),
            members: t
                .member_count
                .map_or_else(|| "-".into(), |n| n.to_string()),
            joined: if t.is_member { "yes" } else { "no" }.into(),
        }
    }
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let key = session.org_key()?;
    let org = key.org().to_owned();

    let adapter = Adapter::new(WithTeams::new(session.api.clone(), session.stores.clone()));
    let state = util::mount_and_settle(&adapter, key, "teams", |s| !s.loading).await?;

    if !state.loaded {
        if let Some(ref error) = state.error {
            return Err(CliError::from_load(error, "organization", &org, "config show"));
        }
    }
    util::warn_stale(state.error.as_ref(), global.quiet);

    let out = output::render_list(
        &global.output,
        state.items.as_slice(),
        |t| TeamRow::from(t),
        |t| t.slug.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
