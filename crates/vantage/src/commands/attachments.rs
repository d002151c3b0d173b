//! Event attachment command handler.

use tabled::Tabled;

use vantage_core::{Adapter, AttachmentKey, EventAttachment, WithAttachments};

use crate::cli::{AttachmentsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Tabled)]
struct AttachmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&EventAttachment> for AttachmentRow {
    fn from(a: &EventAttachment) -> Self {
        Self {
            id: a.id.clone(),
            name: a.name.clone(),
            kind: a.attachment_type.clone(),
            size: human_size(a.size),
            created: a.date_created.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024 && unit < UNITS.len() - 1 {
        value /= 1024;
        unit += 1;
    }
    format!("{value} {}", UNITS.get(unit).copied().unwrap_or("B"))
}

pub async fn handle(
    session: &Session,
    args: AttachmentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let org = session.org_key()?;
    let key = AttachmentKey::new(org.org(), &args.project, &args.event_id)?;

    let adapter = Adapter::new(WithAttachments::new(
        session.api.clone(),
        session.stores.clone(),
    ));
    let entry = util::mount_and_settle(&adapter, key, "attachments", |e| !e.loading).await?;
    let (attachments, _) = util::entry_value(&entry, "event", &args.event_id, "projects")?;

    let out = output::render_list(
        &global.output,
        &attachments,
        |a| AttachmentRow::from(a),
        |a| a.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
