//! Command dispatch: bridges CLI args -> adapters -> output formatting.

pub mod attachments;
pub mod config_cmd;
pub mod org;
pub mod projects;
pub mod release;
pub mod selection;
pub mod teams;
pub mod util;

use vantage_core::{ApiClient, ClientConfig, OrgKey, Stores};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a backend-bound command needs.
pub struct Session {
    pub api: ApiClient,
    pub stores: Stores,
    pub organization: Option<String>,
}

impl Session {
    pub fn new(config: &ClientConfig) -> Result<Self, CliError> {
        Ok(Self {
            api: config.build_client()?,
            stores: config.build_stores(),
            organization: config.organization.clone(),
        })
    }

    /// Key for the active organization.
    pub fn org_key(&self) -> Result<OrgKey, CliError> {
        let org = self
            .organization
            .as_deref()
            .ok_or(CliError::NoOrganization)?;
        Ok(OrgKey::new(org)?)
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Org => org::handle(session, global).await,
        Command::Projects => projects::handle(session, global).await,
        Command::Teams => teams::handle(session, global).await,
        Command::Release(args) => release::handle(session, args, global).await,
        Command::Attachments(args) => attachments::handle(session, args, global).await,
        // Selection, Config and Completions are handled before dispatch
        Command::Selection(_) | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Validation {
                field: "command".into(),
                reason: "not a backend command".into(),
            })
        }
    }
}
