// GitHub API HTTP client.
// Handles optional authentication, rate limit tracking, and response status mapping.

use std::sync::Mutex;

use reqwest::{
    Client, Request, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{FolioError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client with rate limit tracking.
///
/// The listing endpoints are public, so a token is optional and only raises
/// the rate limit.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a new client against `base_url`, authenticating when a token is given.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| FolioError::Other(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("folio-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(FolioError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Create a client, picking up `GITHUB_TOKEN` from the environment if present.
    pub fn from_env(base_url: &str) -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        Self::new(base_url, token.as_deref())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a snapshot of the current rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Make a GET request to an endpoint relative to the API base.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.get_url(&url).await
    }

    /// Make a GET request to an absolute URL (e.g. a repository's `url` field).
    pub async fn get_url(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await.map_err(FolioError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Build a GET request with query parameters without sending it.
    pub fn build_get<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Request> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.client
            .get(&url)
            .query(params)
            .build()
            .map_err(FolioError::Api)
    }

    /// Send a prepared request.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(FolioError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors, attaching the body to unexpected ones.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = map_status(response.status(), response.url().as_str(), &self.rate_limit());
        match status {
            Ok(()) => Ok(response),
            Err(FolioError::Other(message)) => Err(FolioError::Other(format!(
                "{}: {}",
                message,
                response.text().await.unwrap_or_default()
            ))),
            Err(e) => Err(e),
        }
    }
}

/// Map a response status to an error, given the quota seen on that response.
pub fn map_status(status: StatusCode, url: &str, rate_limit: &RateLimit) -> Result<()> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED => Err(FolioError::Unauthorized),
        StatusCode::NOT_FOUND => Err(FolioError::NotFound(url.to_string())),
        StatusCode::FORBIDDEN if rate_limit.remaining == 0 => {
            let reset_at = chrono::DateTime::from_timestamp(rate_limit.reset as i64, 0)
                .map(|dt| dt.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            Err(FolioError::RateLimited { reset_at })
        }
        StatusCode::FORBIDDEN => Err(FolioError::Other("Forbidden".to_string())),
        status => Err(FolioError::Other(format!("HTTP {}", status))),
    }
}
