// Team endpoints

use tracing::debug;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Error;
use crate::models::Team;
use crate::pagination::{CursorTrail, Page};

impl ApiClient {
    /// List one page of the organization's teams.
    ///
    /// `GET /organizations/{org}/teams/`
    pub async fn list_teams(&self, org: &str, cursor: Option<&str>) -> Result<Page<Team>, Error> {
        debug!(org, cursor, "listing teams");
        self.request_page(
            &["organizations", org, "teams"],
            &RequestOptions::get().cursor(cursor),
        )
        .await
    }

    /// List every team of the organization, following pagination cursors.
    pub async fn list_all_teams(&self, org: &str) -> Result<Vec<Team>, Error> {
        let mut teams = Vec::new();
        let mut trail = CursorTrail::default();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.list_teams(org, cursor.as_deref()).await?;
            teams.extend(page.items);
            cursor = trail.advance(page.next);
            if cursor.is_none() {
                return Ok(teams);
            }
        }
    }
}
