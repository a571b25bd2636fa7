//! Page fetching and URL resolution.
//!
//! The cascade talks to the network only through [`PageFetcher`] and
//! [`UrlResolver`], so tests can swap in [`crate::testing::MockFetcher`].

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::security::UrlValidator;

/// Browser-like User-Agent; many publishers refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MAX_REDIRECTS: usize = 5;

/// Largest page body read into memory.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Fetches raw HTML for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body, bounded by `timeout`.
    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchResult<String>;

    /// Drop pooled connections and cookies.
    fn clear_session(&self) {}
}

/// Resolves a URL to its canonical form (after redirects).
///
/// Must be idempotent and return the input unchanged when nothing redirects
/// or when resolution fails.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    async fn resolve(&self, url: &Url) -> Url;
}

/// Resolver that returns every URL unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

#[async_trait]
impl UrlResolver for IdentityResolver {
    async fn resolve(&self, url: &Url) -> Url {
        url.clone()
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.7,pt-BR;q=0.5"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

/// Follow at most [`MAX_REDIRECTS`] hops, each one passing the validator.
///
/// The policy runs synchronously, so hops are checked without DNS; the final
/// URL gets the DNS check once the response arrives.
fn redirect_policy(validator: UrlValidator) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error(format!("more than {} redirects", MAX_REDIRECTS));
        }
        match validator.validate(attempt.url().as_str()) {
            Ok(_) => attempt.follow(),
            Err(e) => {
                warn!(to = %attempt.url(), error = %e, "Blocked redirect");
                attempt.error(e)
            }
        }
    })
}

fn build_client(
    user_agent: &str,
    timeout: Duration,
    validator: &UrlValidator,
) -> FetchResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .default_headers(browser_headers())
        .cookie_store(true)
        .redirect(redirect_policy(validator.clone()))
        .build()
        .map_err(|e| FetchError::Http(Box::new(e)))
}

/// Read a response body, refusing anything over `limit` bytes.
async fn read_capped(mut response: reqwest::Response, url: &Url, limit: usize) -> FetchResult<String> {
    let too_large = || FetchError::TooLarge {
        url: url.to_string(),
        limit,
    };
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?
    {
        if body.len() + chunk.len() > limit {
            warn!(url = %url, limit, "Response body over the size limit");
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// reqwest-backed fetcher with a shared, resettable session.
///
/// Every URL passes [`UrlValidator::validate_with_dns`] first.
pub struct HttpFetcher {
    client: RwLock<reqwest::Client>,
    validator: UrlValidator,
    user_agent: String,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Create a fetcher with browser-like headers and the given timeout.
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        Self::with_user_agent(DEFAULT_USER_AGENT, timeout)
    }

    /// Create a fetcher with a custom User-Agent.
    pub fn with_user_agent(user_agent: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let user_agent = user_agent.into();
        let validator = UrlValidator::new();
        Ok(Self {
            client: RwLock::new(build_client(&user_agent, timeout, &validator)?),
            validator,
            user_agent,
            timeout,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Replace the URL validator. Redirects are checked against it too, so
    /// the session is rebuilt.
    pub fn with_validator(mut self, validator: UrlValidator) -> FetchResult<Self> {
        self.client = RwLock::new(build_client(&self.user_agent, self.timeout, &validator)?);
        self.validator = validator;
        Ok(self)
    }

    /// Cap the body size read per page.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    fn client(&self) -> reqwest::Client {
        self.client
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchResult<String> {
        let url = self.validator.validate_with_dns(url.as_str()).await?;
        debug!(url = %url, "HTTP fetch starting");

        let response = self
            .client()
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                FetchError::from_reqwest(url.as_str(), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let landed = response.url().clone();
        if landed != url {
            self.validator.validate_with_dns(landed.as_str()).await?;
            debug!(from = %url, to = %landed, "Followed redirects");
        }

        read_capped(response, &url, self.max_body_bytes).await
    }

    fn clear_session(&self) {
        match build_client(&self.user_agent, self.timeout, &self.validator) {
            Ok(fresh) => {
                *self
                    .client
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = fresh;
                info!("HTTP session cleared");
            }
            Err(e) => warn!(error = %e, "Failed to rebuild HTTP session; keeping the old one"),
        }
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

/// Follows redirects with a HEAD request to find the canonical URL.
///
/// The input and every hop pass the URL validator; anything blocked leaves
/// the URL as given, for the fetcher to refuse.
#[derive(Debug, Clone)]
pub struct HttpUrlResolver {
    client: reqwest::Client,
    validator: UrlValidator,
    timeout: Duration,
}

impl HttpUrlResolver {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let validator = UrlValidator::new();
        Ok(Self {
            client: build_client(DEFAULT_USER_AGENT, timeout, &validator)?,
            validator,
            timeout,
        })
    }

    pub fn with_validator(mut self, validator: UrlValidator) -> FetchResult<Self> {
        self.client = build_client(DEFAULT_USER_AGENT, self.timeout, &validator)?;
        self.validator = validator;
        Ok(self)
    }
}

#[async_trait]
impl UrlResolver for HttpUrlResolver {
    async fn resolve(&self, url: &Url) -> Url {
        if let Err(e) = self.validator.validate_with_dns(url.as_str()).await {
            debug!(url = %url, error = %e, "Not resolving blocked URL");
            return url.clone();
        }
        match self.client.head(url.clone()).send().await {
            Ok(response) => {
                let resolved = response.url().clone();
                if &resolved != url {
                    debug!(from = %url, to = %resolved, "URL resolved");
                }
                resolved
            }
            Err(e) => {
                debug!(url = %url, error = %e, "URL resolution failed; using original");
                url.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SecurityError;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port.
    async fn serve_once(response: String) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Url::parse(&format!("http://{}/page", addr)).unwrap()
    }

    fn local_fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(2))
            .unwrap()
            .with_validator(UrlValidator::new().allow_host("127.0.0.1"))
            .unwrap()
    }

    #[tokio::test]
    async fn fetcher_refuses_redirect_into_private_range() {
        let url = serve_once(
            "HTTP/1.1 302 Found\r\nLocation: http://169.254.169.254/latest/meta-data\r\n\
             Content-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string(),
        )
        .await;

        let err = local_fetcher()
            .fetch(&url, Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(
            matches!(err, FetchError::Security(SecurityError::BlockedCidr(_))),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn fetcher_refuses_declared_oversized_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 4096\r\n\
             Connection: close\r\n\r\n<html></html>"
                .to_string(),
        )
        .await;

        let err = local_fetcher()
            .with_max_body_bytes(1024)
            .fetch(&url, Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::TooLarge { limit: 1024, .. }));
    }

    #[tokio::test]
    async fn fetcher_stops_reading_undeclared_oversized_body() {
        let body = "<p>padding</p>".repeat(300);
        let url = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n{}",
            body
        ))
        .await;

        let err = local_fetcher()
            .with_max_body_bytes(1024)
            .fetch(&url, Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn fetcher_reads_body_within_limit() {
        let body = "<html><body><p>Hello studio owners</p></body></html>";
        let url = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            body.len(),
            body
        ))
        .await;

        let html = local_fetcher()
            .fetch(&url, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(html, body);
    }

    #[tokio::test]
    async fn identity_resolver_is_idempotent() {
        let url = Url::parse("https://example.com/a?b=c").unwrap();
        let once = IdentityResolver.resolve(&url).await;
        let twice = IdentityResolver.resolve(&once).await;
        assert_eq!(once, url);
        assert_eq!(twice, url);
    }

    #[tokio::test]
    async fn fetcher_rejects_private_addresses_before_connecting() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        let url = Url::parse("http://192.168.1.10/admin").unwrap();
        let err = fetcher.fetch(&url, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, FetchError::Security(_)));
    }

    #[tokio::test]
    async fn resolver_leaves_blocked_urls_untouched() {
        let resolver = HttpUrlResolver::new(Duration::from_secs(1)).unwrap();
        let url = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(resolver.resolve(&url).await, url);
    }

    #[test]
    fn clear_session_keeps_fetcher_usable() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        fetcher.clear_session();
        fetcher.clear_session();
        assert_eq!(fetcher.user_agent, DEFAULT_USER_AGENT);
    }
}
