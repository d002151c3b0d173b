//! Organization command handler.

use vantage_core::{Adapter, Organization, WithOrganization};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{Session, util};

fn detail(org: &Organization, color: bool) -> String {
    let features = if org.features.is_empty() {
        "-".to_owned()
    } else {
        org.features.join(", ")
    };
    [
        format!("{} {}", output::label("ID:      ", color), org.id),
        format!("{} {}", output::label("Slug:    ", color), org.slug),
        format!("{} {}", output::label("Name:    ", color), org.name),
        format!("{} {features}", output::label("Features:", color)),
    ]
    .join("\n")
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let key = session.org_key()?;
    let slug = key.org().to_owned();

    let adapter = Adapter::new(WithOrganization::new(
        session.api.clone(),
        session.stores.clone(),
    ));
    let entry = util::mount_and_settle(&adapter, key, "organization", |e| !e.loading).await?;
    let (org, stale) = util::entry_value(&entry, "organization", &slug, "config show")?;
    util::warn_stale(stale.as_ref(), global.quiet);

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &org,
        |o| detail(o, color),
        |o| o.slug.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
