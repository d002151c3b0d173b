// Project endpoints

use tracing::debug;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Error;
use crate::models::Project;
use crate::pagination::{CursorTrail, Page};

impl ApiClient {
    /// List one page of the organization's projects.
    ///
    /// `GET /organizations/{org}/projects/`
    pub async fn list_projects(
        &self,
        org: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Project>, Error> {
        debug!(org, cursor, "listing projects");
        self.request_page(
            &["organizations", org, "projects"],
            &RequestOptions::get().cursor(cursor),
        )
        .await
    }

    /// List every project of the organization, following pagination cursors.
    pub async fn list_all_projects(&self, org: &str) -> Result<Vec<Project>, Error> {
        let mut projects = Vec::new();
        let mut trail = CursorTrail::default();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.list_projects(org, cursor.as_deref()).await?;
            projects.extend(page.items);
            cursor = trail.advance(page.next);
            if cursor.is_none() {
                return Ok(projects);
            }
        }
    }

    /// Look up specific projects by numeric id.
    ///
    /// `GET /organizations/{org}/projects/?query=id:1 id:2`
    pub async fn projects_by_ids(&self, org: &str, ids: &[i64]) -> Result<Vec<Project>, Error> {
        let query = ids
            .iter()
            .map(|id| format!("id:{id}"))
            .collect::<Vec<_>>()
            .join(" ");
        debug!(org, %query, "fetching projects by id");
        self.request(
            &["organizations", org, "projects"],
            &RequestOptions::get().query("query", query),
        )
        .await
    }
}
