// Authenticated request client for the RODO admin API
// Attaches the stored bearer token, refreshes it once on 401, and tears the
// session down when the refresh cannot recover it

use anyhow::{anyhow, Context, Result as AnyResult};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Request, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::types::{Envelope, LoginData, LoginRequest};
use crate::auth::{refresh_session, TokenPair};
use crate::error::ClientError;
use crate::navigation::Navigator;
use crate::session::SessionManager;

/// Per-request retry state, threaded through the send loop as a value
///
/// Never stored on the request itself: the marker exists exactly as long as
/// the original call, so one call can never trigger two refreshes and
/// concurrent calls never observe each other's markers.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RequestContext {
    retried: bool,
}

impl RequestContext {
    fn initial() -> Self {
        Self { retried: false }
    }

    fn mark_retried(self) -> Self {
        Self { retried: true }
    }
}

/// HTTP client for the RODO admin API
pub struct RodoClient {
    /// Shared HTTP client with connection pooling
    http: Client,

    /// API base URL, normalized to a trailing slash
    base_url: Url,

    /// Session manager over persistent storage
    session: Arc<SessionManager>,

    /// Receiver for the forced-login signal
    navigator: Arc<dyn Navigator>,
}

impl RodoClient {
    /// Create a new client
    pub fn new(
        base_url: Url,
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
        connect_timeout: u64,
        request_timeout: u64,
    ) -> AnyResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .user_agent(format!(
                "rodo-admin/{} ({})",
                env!("CARGO_PKG_VERSION"),
                machine_fingerprint()
            ))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            session,
            navigator,
        })
    }

    /// Resolve a path like `/users` against the base URL
    fn join_path(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Internal(anyhow!("Invalid request path {:?}: {}", path, e)))
    }

    /// Execute a request through the authenticated pipeline
    ///
    /// Every response the server actually produced is returned unchanged,
    /// error statuses included; `Err` is reserved for transport and storage
    /// failures. On a 401 the client silently refreshes the session once and
    /// replays the request; if the refresh fails the session is cleared, the
    /// navigator is sent to the login entry point, and the original 401 goes
    /// back to the caller.
    pub async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let method = request.method().clone();
        let url = request.url().clone();
        let request_id = Uuid::new_v4();
        let mut ctx = RequestContext::initial();

        tracing::debug!(method = %method, url = %url, request_id = %request_id, "Sending request");

        loop {
            // Fresh clone per attempt; a replay re-reads storage and thus
            // carries the refreshed token
            let mut attempt = request.try_clone().ok_or_else(|| {
                ClientError::Internal(anyhow!("Request body is not cloneable"))
            })?;

            if let Some(token) = self.session.access_token()? {
                let header = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ClientError::Internal(anyhow!("Invalid access token: {}", e)))?;
                attempt.headers_mut().insert(AUTHORIZATION, header);
            }

            if let Ok(id_header) = HeaderValue::from_str(&request_id.to_string()) {
                attempt.headers_mut().insert("X-Request-Id", id_header);
            }

            let response = self.http.execute(attempt).await?;
            let status = response.status();

            if status != StatusCode::UNAUTHORIZED {
                tracing::debug!(status = %status, request_id = %request_id, "Received response");
                return Ok(response);
            }

            if ctx.retried {
                // A refresh was already spent on this call; hand the 401 back
                tracing::warn!(
                    url = %url,
                    request_id = %request_id,
                    "Still unauthorized after token refresh"
                );
                return Ok(response);
            }

            ctx = ctx.mark_retried();
            tracing::debug!(request_id = %request_id, "Received 401, attempting token refresh");

            match refresh_session(&self.http, &self.base_url, &self.session).await {
                Ok(_) => {
                    tracing::debug!(request_id = %request_id, "Replaying original request");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        request_id = %request_id,
                        "Token refresh failed, clearing session"
                    );
                    self.session.clear()?;
                    self.navigator.redirect_to_login();
                    // Propagate the original failure, untouched
                    return Ok(response);
                }
            }
        }
    }

    /// GET a path
    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        let request = self.http.get(self.join_path(path)?).build()?;
        self.execute(request).await
    }

    /// POST a JSON body to a path
    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, ClientError> {
        let request = self
            .http
            .post(self.join_path(path)?)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .build()?;
        self.execute(request).await
    }

    /// PUT a JSON body to a path
    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, ClientError> {
        let request = self
            .http
            .put(self.join_path(path)?)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .build()?;
        self.execute(request).await
    }

    /// DELETE a path
    pub async fn delete(&self, path: &str) -> Result<Response, ClientError> {
        let request = self.http.delete(self.join_path(path)?).build()?;
        self.execute(request).await
    }

    /// GET a path and decode the `{ data }` envelope
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        Self::decode(self.get(path).await?).await
    }

    /// POST a JSON body and decode the `{ data }` envelope
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::decode(self.post(path, body).await?).await
    }

    /// Authenticate against the login endpoint and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ClientError> {
        let response = self
            .http
            .post(self.join_path("auth/login")?)
            .header(CONTENT_TYPE, "application/json")
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<LoginData> = response.json().await?;
        self.session.store_login(&TokenPair {
            access_token: envelope.data.access_token.clone(),
            refresh_token: Some(envelope.data.refresh_token.clone()),
        })?;

        tracing::info!("Login successful, session stored");
        Ok(envelope.data)
    }

    /// Drop the stored session
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear()?;
        tracing::info!("Session cleared");
        Ok(())
    }

    /// The session manager this client writes through
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Decode a `{ data }` envelope, mapping error statuses to `ClientError::Api`
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

/// Ensure the base URL ends with a slash so `Url::join` appends instead of
/// replacing the last path segment
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Hostname hash for the User-Agent, same machine fingerprint scheme the
/// desktop tooling sends
fn machine_fingerprint() -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    let mut hasher = DefaultHasher::new();
    hostname.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::LogNavigator;
    use crate::storage::MemoryStore;

    fn test_client(base: &str) -> RodoClient {
        let session = Arc::new(SessionManager::new(Arc::new(MemoryStore::new())));
        RodoClient::new(
            Url::parse(base).unwrap(),
            session,
            Arc::new(LogNavigator),
            5,
            30,
        )
        .unwrap()
    }

    #[test]
    fn test_request_context_one_shot() {
        let ctx = RequestContext::initial();
        assert!(!ctx.retried);

        let ctx = ctx.mark_retried();
        assert!(ctx.retried);

        // Marking again changes nothing
        assert_eq!(ctx.mark_retried(), ctx);
    }

    #[test]
    fn test_normalize_base_url() {
        let url = normalize_base_url(Url::parse("http://localhost:5000/api/v1").unwrap());
        assert_eq!(url.as_str(), "http://localhost:5000/api/v1/");

        let url = normalize_base_url(Url::parse("http://localhost:5000/api/v1/").unwrap());
        assert_eq!(url.as_str(), "http://localhost:5000/api/v1/");
    }

    #[test]
    fn test_join_path_keeps_base_prefix() {
        let client = test_client("http://localhost:5000/api/v1");

        let url = client.join_path("/users").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/v1/users");

        let url = client.join_path("users").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/v1/users");

        let url = client.join_path("auth/refresh-token").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/v1/auth/refresh-token"
        );
    }

    #[test]
    fn test_machine_fingerprint_is_stable_hex() {
        let a = machine_fingerprint();
        let b = machine_fingerprint();
        assert_eq!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
