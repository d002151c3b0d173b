// vantage-core: client-side state layer between vantage-api and views.
//
// Stores cache fetched entities and notify subscribers; action creators
// fill stores from the API; adapters bind a consumer's lifetime to a
// store subscription and publish typed props.

pub mod actions;
pub mod adapter;
pub mod config;
pub mod error;
pub mod model;
pub mod selection;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::{
    Adapter, Binding, PropsStream, WithAttachments, WithGlobalSelection, WithOrganization,
    WithProjects, WithRelease, WithTeams,
};
pub use config::{ClientConfig, TlsVerification};
pub use error::{CoreError, LoadError, LoadErrorKind};
pub use model::{AttachmentKey, CacheKey, Entity, OrgKey, ReleaseKey};
pub use selection::{DateTimeSelection, GlobalSelection, SelectionQuery};
pub use store::{
    CacheEntry, Change, CollectionState, ErrorPolicy, ReleaseSlice, SelectionState,
    SelectionUpdate, StoreSettings, Stores, Subscription,
};

// The client type views and CLIs hand to adapters.
pub use vantage_api::ApiClient;

// Re-export entity types at the crate root for ergonomics.
pub use model::{
    Deploy, EventAttachment, Organization, Project, Release, ReleaseAuthor, ReleaseProject, Team,
    TeamRef,
};
