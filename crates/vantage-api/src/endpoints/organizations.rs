// Organization endpoints

use tracing::debug;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Error;
use crate::models::Organization;

impl ApiClient {
    /// Fetch organization details.
    ///
    /// `GET /organizations/{org}/`
    pub async fn organization(&self, org: &str) -> Result<Organization, Error> {
        debug!(org, "fetching organization");
        self.request(&["organizations", org], &RequestOptions::get())
            .await
    }
}
