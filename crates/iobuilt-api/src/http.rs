// HTTP client wrapper
//
// Wraps `reqwest::Client` with base-URL path joining, bearer-token injection
// from the session store, and the global 401 policy: clear the session and
// send the navigator to the login view. Everything else (transport errors,
// other non-2xx statuses) propagates to the caller exactly once.

use std::fmt;
use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::paths::EndpointPaths;
use crate::session::{Navigator, SessionStore};
use crate::transport::TransportConfig;

// ── Context ──────────────────────────────────────────────────────────

/// Everything an API class needs to build its HTTP client.
///
/// Cheap to clone; the session and navigator are shared handles.
#[derive(Clone)]
pub struct ApiContext {
    pub base_url: Url,
    pub paths: EndpointPaths,
    pub login_path: String,
    /// Origin of the front end, used for payment redirect URLs.
    pub app_origin: String,
    pub transport: TransportConfig,
    pub session: Arc<dyn SessionStore>,
    pub navigator: Arc<dyn Navigator>,
}

impl ApiContext {
    pub fn new(
        base_url: Url,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            base_url,
            paths: EndpointPaths::default(),
            login_path: "/login".into(),
            app_origin: "http://localhost:5173".into(),
            transport: TransportConfig::default(),
            session,
            navigator,
        }
    }

    pub fn with_paths(mut self, paths: EndpointPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn with_app_origin(mut self, origin: impl Into<String>) -> Self {
        self.app_origin = origin.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

impl fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiContext")
            .field("base_url", &self.base_url.as_str())
            .field("paths", &self.paths)
            .field("login_path", &self.login_path)
            .field("app_origin", &self.app_origin)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

// ── Response ─────────────────────────────────────────────────────────

/// A successful (2xx) response: status plus decoded body, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, data: Option<T>) -> Self {
        Self { status, data }
    }

    /// A 200 response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self::new(200, Some(data))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The payload, or `Error::EmptyBody` when the backend sent none.
    pub fn into_data(self) -> Result<T, Error> {
        self.data.ok_or(Error::EmptyBody {
            status: self.status,
        })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            data: self.data.map(f),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// HTTP client bound to one base URL and one session.
///
/// API classes construct one each; clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    login_path: String,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl HttpClient {
    /// Build a new client from the shared transport settings in `ctx`.
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = ctx.transport.build_client()?;
        Ok(Self::with_client(http, ctx))
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, ctx: &ApiContext) -> Self {
        Self {
            http,
            base_url: ctx.base_url.clone(),
            login_path: ctx.login_path.clone(),
            session: Arc::clone(&ctx.session),
            navigator: Arc::clone(&ctx.navigator),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join `path` onto the base URL, keeping any base path prefix.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Ok(Url::parse(&full)?)
    }

    // ── Verbs ────────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, Error> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, Error> {
        let url = self.url(path)?;
        debug!(%url, ?query, "GET");
        self.execute(self.http.get(url).query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, Error> {
        let url = self.url(path)?;
        debug!(%url, "POST");
        self.execute(self.http.post(url).json(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, Error> {
        let url = self.url(path)?;
        debug!(%url, "PUT");
        self.execute(self.http.put(url).json(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, Error> {
        let url = self.url(path)?;
        debug!(%url, "PATCH");
        self.execute(self.http.patch(url).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, Error> {
        let url = self.url(path)?;
        debug!(%url, "DELETE");
        self.execute(self.http.delete(url)).await
    }

    // ── Interceptors ─────────────────────────────────────────────────

    /// Attach the bearer token when the session holds one.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send the request, apply the 401 policy, and decode the body.
    async fn execute<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<ApiResponse<T>, Error> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected the session, forcing logout");
            self.session.clear();
            self.navigator.navigate(&self.login_path);
            return Err(Error::Unauthorized);
        }

        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
                body,
            });
        }

        let data = if body.trim().is_empty() {
            None
        } else {
            let parsed = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;
            Some(parsed)
        };

        Ok(ApiResponse::new(status.as_u16(), data))
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Prefer the backend's `{ "message": ... }` over the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned())
}
