//! Async Rust client for the monitoring dashboard REST API.
//!
//! [`ApiClient`] wraps `reqwest` with bearer-token auth, percent-encoded
//! path construction, `{"detail": ...}` error decoding and Link-header
//! pagination. It exposes two request styles:
//!
//! - [`ApiClient::request`]: `async`, returns `Result<T, Error>`.
//! - [`ApiClient::request_with`]: callback style, spawns the call on the
//!   current tokio runtime.
//!
//! Typed endpoint methods (`organization`, `list_projects`, `project_release`,
//! ...) sit on top of those two primitives.

pub mod client;
pub mod error;
pub mod models;
pub mod pagination;
pub mod transport;

mod endpoints;

pub use client::{ApiClient, RequestOptions};
pub use error::Error;
pub use models::{
    Deploy, EventAttachment, Organization, Project, Release, ReleaseAuthor, ReleaseProject, Team,
    TeamRef,
};
pub use pagination::{Page, PageLink, PageLinks, parse_link_header};
pub use reqwest::Method;
pub use transport::{TlsMode, TransportConfig};
