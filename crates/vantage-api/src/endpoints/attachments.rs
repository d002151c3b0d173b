// Event attachment endpoints

use tracing::debug;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Error;
use crate::models::EventAttachment;

impl ApiClient {
    /// List the files attached to an event.
    ///
    /// `GET /projects/{org}/{project}/events/{event}/attachments/`
    pub async fn event_attachments(
        &self,
        org: &str,
        project: &str,
        event_id: &str,
    ) -> Result<Vec<EventAttachment>, Error> {
        debug!(org, project, event_id, "listing event attachments");
        self.request(
            &["projects", org, project, "events", event_id, "attachments"],
            &RequestOptions::get(),
        )
        .await
    }
}
