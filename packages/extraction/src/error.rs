//! Typed errors for the extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while fetching a page.
///
/// A fetch failure only ever fails the attempt that produced it; the caller
/// moves on to the next candidate URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Security validation failed
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Connection or read timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Payload too small to contain an article
    #[error("HTML too small for {url}: {chars} < {min} characters")]
    TooSmall { url: String, chars: usize, min: usize },

    /// Body larger than the fetcher accepts
    #[error("body of {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl FetchError {
    /// Wrap a reqwest error, keeping timeouts distinguishable.
    ///
    /// A redirect refused by the URL validator comes back as
    /// [`FetchError::Security`].
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
            };
        }
        match security_cause(&err) {
            Some(blocked) => Self::Security(blocked),
            None => Self::Http(Box::new(err)),
        }
    }
}

fn security_cause(err: &(dyn std::error::Error + 'static)) -> Option<SecurityError> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(security) = cause.downcast_ref::<SecurityError>() {
            return Some(security.clone());
        }
        source = cause.source();
    }
    None
}

/// A failure inside a single extraction strategy.
///
/// Recorded against that strategy's statistics; never aborts the cascade.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The strategy could not parse or select anything usable
    #[error("{strategy} failed: {reason}")]
    Failed {
        strategy: &'static str,
        reason: String,
    },

    /// The strategy panicked while processing the document
    #[error("{strategy} panicked: {message}")]
    Panicked {
        strategy: &'static str,
        message: String,
    },
}

impl StrategyError {
    /// Create a plain failure for a strategy.
    pub fn failed(strategy: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            strategy,
            reason: reason.into(),
        }
    }
}

/// Why a whole `extract` call produced no text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Resolving or fetching the page failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Every available strategy ran and none produced accepted text
    #[error("all {tried} extraction strategies failed for {url}")]
    Exhausted { url: String, tried: usize },
}

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Clone, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, internal IPs)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// DNS resolution failed
    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for whole extractions.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for strategy runs.
pub type StrategyResult<T> = std::result::Result<T, StrategyError>;

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
