// ── Domain model ──
//
// Entities are the API wire types re-exported as-is; the store layer adds
// typed cache keys and the `Entity` view used by unkeyed collections.

mod key;

pub use key::{AttachmentKey, CacheKey, OrgKey, ReleaseKey};
pub use vantage_api::models::{
    Deploy, EventAttachment, Organization, Project, Release, ReleaseAuthor, ReleaseProject, Team,
    TeamRef,
};

/// An entity held in a [`CollectionStore`](crate::store::CollectionStore).
///
/// Collections index by `id` and keep their snapshot ordered by `sort_key`.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn slug(&self) -> &str;
    fn set_slug(&mut self, slug: String);

    fn sort_key(&self) -> &str {
        self.slug()
    }
}

impl Entity for Project {
    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn set_slug(&mut self, slug: String) {
        self.slug = slug;
    }
}

impl Entity for Team {
    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn set_slug(&mut self, slug: String) {
        self.slug = slug;
    }
}
