#![allow(clippy::unwrap_used)]
// Integration tests for action creators and adapters against a mock backend.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vantage_api::ApiClient;
use vantage_core::actions::{
    fetch_attachments, fetch_organization, fetch_projects, fetch_release, switch_organization,
};
use vantage_core::{
    Adapter, AttachmentKey, CacheKey, LoadErrorKind, OrgKey, ReleaseKey, SelectionQuery, Stores,
    WithAttachments, WithGlobalSelection, WithProjects, WithRelease,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient, Stores) {
    let server = MockServer::start().await;
    let client = ApiClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    (server, client, Stores::default())
}

fn release_json(version: &str) -> serde_json::Value {
    json!({
        "version": version,
        "shortVersion": version,
        "dateCreated": "2020-06-01T12:00:00Z",
        "newGroups": 4,
        "commitCount": 12,
        "authors": [{"name": "Jane", "email": "jane@example.com"}],
        "projects": [{"slug": "web", "name": "Web"}]
    })
}

fn attachment_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "minidump.dmp",
        "size": 2048,
        "dateCreated": "2020-06-01T12:00:00Z",
        "event_id": "abc123",
        "type": "event.minidump"
    })
}

fn project_json(id: &str, slug: &str) -> serde_json::Value {
    json!({"id": id, "slug": slug, "name": slug})
}

// ── Dedup ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_back_to_back_fetches_issue_one_request() {
    let (server, api, stores) = setup().await;

    Mock::given(method("GET"))
        .and(path("/projects/acme/web/releases/1.0.0/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(release_json("1.0.0"))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let key = ReleaseKey::new("acme", "web", "1.0.0").unwrap();
    let first = fetch_release(&api, &stores, &key);
    let second = fetch_release(&api, &stores, &key);

    assert!(first.is_some());
    assert!(second.is_none());
    assert!(stores.releases().get(&key).release.loading);

    first.unwrap().await.unwrap();
    let slice = stores.releases().get(&key);
    assert!(!slice.release.loading);
    assert_eq!(slice.release.value().unwrap().commit_count, 12);

    // Fresh value: no further request.
    assert!(fetch_release(&api, &stores, &key).is_none());
}

// ── Outcomes ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_fetch_stores_error_and_keeps_stale_value() {
    let (server, api, stores) = setup().await;
    let key = ReleaseKey::new("acme", "web", "2.0.0").unwrap();
    stores
        .releases()
        .releases()
        .load_success(&key.cache_key(), serde_json::from_value(release_json("2.0.0")).unwrap());
    stores.releases().releases().load_error(
        &key.cache_key(),
        vantage_core::LoadError::new(LoadErrorKind::Network, "earlier failure"),
    );

    Mock::given(method("GET"))
        .and(path("/projects/acme/web/releases/2.0.0/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Internal Error"})))
        .expect(1)
        .mount(&server)
        .await;

    fetch_release(&api, &stores, &key).unwrap().await.unwrap();

    let entry = stores.releases().get(&key).release;
    let error = entry.error.as_ref().unwrap();
    assert_eq!(error.kind, LoadErrorKind::Application);
    assert_eq!(error.status, Some(500));
    assert_eq!(error.message, "HTTP 500: Internal Error");
    assert_eq!(entry.value().unwrap().version, "2.0.0");
}

#[tokio::test]
async fn test_attachment_error_clears_value() {
    let (server, api, stores) = setup().await;
    let key = AttachmentKey::new("acme", "web", "abc123").unwrap();

    Mock::given(method("GET"))
        .and(path("/projects/acme/web/events/abc123/attachments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([attachment_json("1")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/acme/web/events/abc123/attachments/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Forbidden"})))
        .mount(&server)
        .await;

    fetch_attachments(&api, &stores, &key).unwrap().await.unwrap();
    assert_eq!(stores.attachments().get(&key.cache_key()).value().unwrap().len(), 1);

    // Force a refetch by recording an error, then fail for real.
    stores.attachments().load_error(
        &key.cache_key(),
        vantage_core::LoadError::new(LoadErrorKind::Network, "flaky"),
    );
    fetch_attachments(&api, &stores, &key).unwrap().await.unwrap();

    let entry = stores.attachments().get(&key.cache_key());
    assert!(entry.value.is_none());
    assert_eq!(entry.error.unwrap().status, Some(403));
}

#[tokio::test]
async fn test_organization_fetch_marks_selection_loaded() {
    let (server, api, stores) = setup().await;

    Mock::given(method("GET"))
        .and(path("/organizations/acme/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1", "slug": "acme", "name": "Acme"
        })))
        .expect(1)
        .mount(&server)
        .await;

    stores
        .selection()
        .initialize_url_state("acme", &SelectionQuery::default(), false);
    let key = OrgKey::new("acme").unwrap();
    fetch_organization(&api, &stores, &key).unwrap().await.unwrap();

    assert_eq!(stores.selection().organization().as_deref(), Some("acme"));
    assert!(stores.selection().get().is_ready);
}

#[tokio::test]
async fn test_switch_organization_drops_previous_projects() {
    let (server, api, stores) = setup().await;

    for (org, slug) in [("acme", "web"), ("globex", "api")] {
        Mock::given(method("GET"))
            .and(path(format!("/organizations/{org}/projects/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([project_json("1", slug)])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/organizations/{org}/teams/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/organizations/{org}/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1", "slug": org, "name": org
            })))
            .mount(&server)
            .await;
    }

    let acme = OrgKey::new("acme").unwrap();
    fetch_projects(&api, &stores, &acme).unwrap().await.unwrap();
    assert_eq!(stores.projects().get_by_slug("web").unwrap().id, "1");

    let globex = OrgKey::new("globex").unwrap();
    let handles = switch_organization(&api, &stores, &globex);
    assert_eq!(handles.len(), 3);
    assert!(stores.projects().get_by_slug("web").is_none());
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(stores.projects().scope().as_deref(), Some("globex"));
    assert_eq!(stores.projects().get_all()[0].slug, "api");
    assert!(stores.teams().state().loaded);
}

async fn mount_org(server: &MockServer, org: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/organizations/{org}/")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "1", "slug": org, "name": org}))
                .set_delay(delay),
        )
        .mount(server)
        .await;
    for listing in ["projects", "teams"] {
        Mock::given(method("GET"))
            .and(path(format!("/organizations/{org}/{listing}/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_switching_back_to_cached_organization_is_ready() {
    let (server, api, stores) = setup().await;
    for org in ["acme", "globex"] {
        mount_org(&server, org, Duration::ZERO).await;
    }
    stores
        .selection()
        .initialize_url_state("acme", &SelectionQuery::default(), false);

    for org in ["acme", "globex"] {
        for handle in switch_organization(&api, &stores, &OrgKey::new(org).unwrap()) {
            handle.await.unwrap();
        }
        assert!(stores.selection().get().is_ready);
    }

    // acme's details are still cached: only projects and teams are fetched.
    let handles = switch_organization(&api, &stores, &OrgKey::new("acme").unwrap());
    assert_eq!(handles.len(), 2);
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(stores.selection().organization().as_deref(), Some("acme"));
    assert!(stores.selection().get().is_ready);
}

#[tokio::test]
async fn test_late_organization_response_does_not_override_switch() {
    let (server, api, stores) = setup().await;
    mount_org(&server, "acme", Duration::from_millis(300)).await;
    mount_org(&server, "globex", Duration::ZERO).await;
    stores
        .selection()
        .initialize_url_state("acme", &SelectionQuery::default(), false);

    let slow = fetch_organization(&api, &stores, &OrgKey::new("acme").unwrap()).unwrap();
    for handle in switch_organization(&api, &stores, &OrgKey::new("globex").unwrap()) {
        handle.await.unwrap();
    }
    assert_eq!(stores.selection().organization().as_deref(), Some("globex"));

    slow.await.unwrap();
    assert_eq!(stores.selection().organization().as_deref(), Some("globex"));
    assert_eq!(stores.projects().scope().as_deref(), Some("globex"));
    assert!(stores.organizations().get("acme").value().is_some());
}

// ── Adapters ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_release_adapter_publishes_release_and_deploys() {
    let (server, api, stores) = setup().await;

    Mock::given(method("GET"))
        .and(path("/projects/acme/web/releases/1.0.0/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json("1.0.0")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/acme/releases/1.0.0/deploys/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "9",
            "environment": "production",
            "dateFinished": "2020-06-02T00:00:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = Adapter::new(WithRelease::new(api.clone(), stores.clone()));
    let handles = adapter.mount(ReleaseKey::new("acme", "web", "1.0.0").unwrap());
    assert_eq!(handles.len(), 2);
    let mut props = adapter.stream();

    let settled = props.wait_for(|p| !p.loading()).await.unwrap();
    assert_eq!(settled.release.value().unwrap().version, "1.0.0");
    assert_eq!(settled.deploys.value().unwrap()[0].environment, "production");

    // A second adapter on the same key reuses the cache.
    let other = Adapter::new(WithRelease::new(api, stores));
    assert!(other.mount(ReleaseKey::new("acme", "web", "1.0.0").unwrap()).is_empty());
    assert_eq!(other.props(), settled);
}

#[tokio::test]
async fn test_project_adapter_key_change_refetches() {
    let (server, api, stores) = setup().await;

    for (org, slug) in [("acme", "web"), ("globex", "api")] {
        Mock::given(method("GET"))
            .and(path(format!("/organizations/{org}/projects/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([project_json("1", slug)])))
            .expect(1)
            .mount(&server)
            .await;
    }

    let adapter = Adapter::new(WithProjects::new(api, stores));
    for handle in adapter.mount(OrgKey::new("acme").unwrap()) {
        handle.await.unwrap();
    }
    assert_eq!(adapter.props().items[0].slug, "web");

    for handle in adapter.set_key(OrgKey::new("globex").unwrap()) {
        handle.await.unwrap();
    }
    let props = adapter.props();
    assert!(props.loaded);
    assert_eq!(props.items[0].slug, "api");

    adapter.unmount();
    adapter.unmount();
    assert!(!adapter.is_mounted());
}

#[tokio::test]
async fn test_attachment_adapter_ignores_other_events() {
    let (server, api, stores) = setup().await;

    Mock::given(method("GET"))
        .and(path("/projects/acme/web/events/abc123/attachments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([attachment_json("1")])))
        .mount(&server)
        .await;

    let adapter = Adapter::new(WithAttachments::new(api, stores.clone()));
    for handle in adapter.mount(AttachmentKey::new("acme", "web", "abc123").unwrap()) {
        handle.await.unwrap();
    }
    let mut props = adapter.stream();

    stores.attachments().load("acme web other");
    assert!(!props.has_changed());

    stores
        .attachments()
        .load_error("acme web abc123", vantage_core::LoadError::new(LoadErrorKind::Decode, "bad"));
    let changed = props.changed().await.unwrap();
    assert!(changed.value.is_none());
}

#[tokio::test]
async fn test_global_selection_adapter_tracks_store() {
    let stores = Stores::default();
    let adapter = Adapter::new(WithGlobalSelection::new(stores.clone()));
    assert!(adapter.mount(()).is_empty());
    assert!(!adapter.props().is_ready);

    stores
        .selection()
        .initialize_url_state("acme", &SelectionQuery::parse("project=3"), false);
    stores.selection().load_initial_data("acme");

    let props = adapter.props();
    assert!(props.is_ready);
    assert_eq!(props.selection.projects, vec![3]);
}
