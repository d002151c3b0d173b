// REST API HTTP client
//
// Wraps `reqwest::Client` with base-URL path construction, bearer auth,
// error-body decoding and Link-header pagination. Endpoint methods live
// in `crate::endpoints` as inherent methods so this module stays focused
// on transport mechanics.

use reqwest::Method;
use reqwest::header::LINK;
use serde::de::DeserializeOwned;
use secrecy::SecretString;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::pagination::{Page, parse_link_header};
use crate::transport::TransportConfig;

/// Body shape the backend uses for error responses.
#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Method, query string and JSON body of a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub data: Option<serde_json::Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
            data: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Append a query pair. Repeating a name sends it several times.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Request a specific page of a paginated listing.
    pub fn cursor(self, cursor: Option<&str>) -> Self {
        match cursor {
            Some(c) => self.query("cursor", c),
            None => self,
        }
    }
}

/// HTTP client for the dashboard REST API.
///
/// Cheap to clone: `reqwest::Client` is reference counted internally, so
/// clones can be moved into spawned request tasks.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `https://monitor.example.com/api/0/`).
    ///
    /// With a token, every request carries `Authorization: Bearer <token>`.
    pub fn new(
        base_url: Url,
        token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = match token {
            Some(token) => transport.build_authenticated_client(token)?,
            None => transport.build_client()?,
        };
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{segments...}/` with every segment percent-encoded.
    ///
    /// Release versions may contain `/` or `+`; encoding keeps them a single
    /// path segment.
    pub fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
            path.push("");
        }
        Ok(url)
    }

    // ── Request entry points ─────────────────────────────────────────

    /// Issue a request and decode the JSON response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        opts: &RequestOptions,
    ) -> Result<T, Error> {
        let url = self.api_url(segments)?;
        let resp = self.send(url, opts).await?;
        parse_response(resp).await
    }

    /// Issue a request for one page of a paginated listing.
    pub async fn request_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        opts: &RequestOptions,
    ) -> Result<Page<T>, Error> {
        let url = self.api_url(segments)?;
        let resp = self.send(url, opts).await?;
        let links = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(parse_link_header)
            .unwrap_or_default();
        let items: Vec<T> = parse_response(resp).await?;
        Ok(Page::new(items, &links))
    }

    /// Callback-style request: spawns the call on the current tokio runtime
    /// and hands the decoded result to `on_complete`.
    pub fn request_with<T, F>(
        &self,
        segments: Vec<String>,
        opts: RequestOptions,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, Error>) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let parts: Vec<&str> = segments.iter().map(String::as_str).collect();
            let result = client.request::<T>(&parts, &opts).await;
            on_complete(result);
        })
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn send(&self, url: Url, opts: &RequestOptions) -> Result<reqwest::Response, Error> {
        debug!(method = %opts.method, %url, "sending request");

        let mut builder = self.http.request(opts.method.clone(), url);
        if !opts.query.is_empty() {
            builder = builder.query(&opts.query);
        }
        if let Some(ref data) = opts.data {
            builder = builder.json(data);
        }

        let resp = builder.send().await.map_err(Error::Transport)?;
        trace!(status = %resp.status(), "response received");
        Ok(resp)
    }
}

/// Map non-success statuses onto `Error`, otherwise decode the JSON body.
///
/// An empty success body (e.g. 204) decodes as JSON `null`, so callers
/// expecting `()` or `Option<_>` work unchanged.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Authentication {
            message: error_detail(&body).unwrap_or_else(|| "invalid or expired token".into()),
        });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            detail: error_detail(&body),
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;
    let text = if body.trim().is_empty() { "null" } else { body.as_str() };

    serde_json::from_str(text).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Extract `detail` from an error body. Non-string details are rendered as JSON.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
