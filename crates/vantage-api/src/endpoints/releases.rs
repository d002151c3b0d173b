// Release and deploy endpoints

use tracing::debug;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Error;
use crate::models::{Deploy, Release};

impl ApiClient {
    /// Fetch a release as seen from one project.
    ///
    /// `GET /projects/{org}/{project}/releases/{version}/`
    pub async fn project_release(
        &self,
        org: &str,
        project: &str,
        version: &str,
    ) -> Result<Release, Error> {
        debug!(org, project, version, "fetching release");
        self.request(
            &["projects", org, project, "releases", version],
            &RequestOptions::get(),
        )
        .await
    }

    /// List the deploys of a release.
    ///
    /// `GET /organizations/{org}/releases/{version}/deploys/`
    pub async fn release_deploys(&self, org: &str, version: &str) -> Result<Vec<Deploy>, Error> {
        debug!(org, version, "fetching release deploys");
        self.request(
            &["organizations", org, "releases", version, "deploys"],
            &RequestOptions::get(),
        )
        .await
    }
}
