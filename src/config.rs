//! Client configuration and the builder that validates it.
//!
//! A [`ClientConfig`] is assembled once by a [`ClientBuilder`] and is never
//! modified afterwards. Every clone of a [`Client`] shares the same instance.

use crate::{
    logger::{Logger, TracingLogger},
    retry::Backoff,
    transport::{ReqwestTransport, Transport},
    Client, Error, Result,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Number of attempts per call when none is configured.
pub const DEFAULT_RETRY_COUNT: usize = 3;

/// Per-attempt timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable read by [`ClientBuilder::from_env`] for the base URL.
pub const BASE_URL_ENV: &str = "BLNK_BASE_URL";

/// Environment variable read by [`ClientBuilder::from_env`] for the API key.
pub const API_KEY_ENV: &str = "BLNK_API_KEY";

/// Read-only settings shared by every call a client makes.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: Url,
    credential: Option<HeaderValue>,
    retry_count: usize,
    timeout: Duration,
    backoff: Backoff,
    default_headers: HeaderMap,
    logger: Arc<dyn Logger>,
}

impl ClientConfig {
    /// The absolute URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The API key sent in the `X-Blnk-Key` header, if any.
    pub fn credential(&self) -> Option<&HeaderValue> {
        self.credential.as_ref()
    }

    /// The maximum number of attempts per call.
    pub fn retry_count(&self) -> usize {
        self.retry_count
    }

    /// The per-attempt timeout enforced by the transport.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The delay policy between attempts.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Headers attached to every request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// The logger retries and failures are reported to.
    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("retry_count", &self.retry_count)
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A single configuration override, applied in order by [`Client::new`].
#[derive(Clone)]
pub enum ClientOption {
    /// Maximum number of attempts per call. Must be positive.
    RetryCount(usize),
    /// Per-attempt timeout. Must be non-zero.
    Timeout(Duration),
    /// Logger for retries and failures.
    Logger(Arc<dyn Logger>),
    /// Delay policy between attempts.
    Backoff(Backoff),
    /// Header attached to every request.
    DefaultHeader(String, String),
}

impl fmt::Debug for ClientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientOption::RetryCount(count) => f.debug_tuple("RetryCount").field(count).finish(),
            ClientOption::Timeout(timeout) => f.debug_tuple("Timeout").field(timeout).finish(),
            ClientOption::Logger(_) => f.write_str("Logger(..)"),
            ClientOption::Backoff(backoff) => f.debug_tuple("Backoff").field(backoff).finish(),
            ClientOption::DefaultHeader(name, value) => f
                .debug_tuple("DefaultHeader")
                .field(name)
                .field(value)
                .finish(),
        }
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use blnk_http::{Backoff, ClientBuilder};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), blnk_http::Error> {
/// let client = ClientBuilder::new()
///     .base_url("http://localhost:5001")?
///     .api_key("blnk-secret")?
///     .retry_count(5)
///     .timeout(Duration::from_secs(30))
///     .backoff(Backoff::Exponential {
///         initial_delay: Duration::from_millis(200),
///         max_delay: Duration::from_secs(5),
///         jitter: true,
///     })
///     .default_header("User-Agent", "ledger-sync/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    credential: Option<HeaderValue>,
    retry_count: usize,
    timeout: Duration,
    backoff: Backoff,
    default_headers: HeaderMap,
    logger: Arc<dyn Logger>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            credential: None,
            retry_count: DEFAULT_RETRY_COUNT,
            timeout: DEFAULT_TIMEOUT,
            backoff: Backoff::default(),
            default_headers: HeaderMap::new(),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Creates a builder from the `BLNK_BASE_URL` and `BLNK_API_KEY`
    /// environment variables.
    ///
    /// `BLNK_BASE_URL` is required; `BLNK_API_KEY` is optional.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL variable is missing,
    /// empty or invalid, or if the API key is not a valid header value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(BASE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!("missing {BASE_URL_ENV} environment variable"))
            })?;

        let builder = Self::new().base_url(base_url)?;
        match lookup(API_KEY_ENV).filter(|value| !value.trim().is_empty()) {
            Some(key) => builder.api_key(key),
            None => Ok(builder),
        }
    }

    /// Sets the base URL for all requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the URL is empty, unparsable, not
    /// absolute, or carries a query string or fragment.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let raw = url.as_ref().trim();
        if raw.is_empty() {
            return Err(Error::Configuration("base URL is required".to_string()));
        }

        let parsed = Url::parse(raw)
            .map_err(|e| Error::Configuration(format!("invalid base URL {raw:?}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "base URL {raw:?} cannot be used as a base"
            )));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(Error::Configuration(format!(
                "base URL {raw:?} must not carry a query string or fragment"
            )));
        }

        self.base_url = Some(parsed);
        Ok(self)
    }

    /// Sets the API key sent as `X-Blnk-Key` on every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the key is not a valid header value.
    pub fn api_key(mut self, key: impl AsRef<str>) -> Result<Self> {
        let mut value = HeaderValue::try_from(key.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid API key: {}", e)))?;
        value.set_sensitive(true);
        self.credential = Some(value);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the maximum number of attempts per call.
    pub fn retry_count(mut self, count: usize) -> Self {
        self.retry_count = count;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the delay policy between attempts.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the logger retries and failures are reported to.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Applies one [`ClientOption`].
    ///
    /// # Errors
    ///
    /// Returns an error if a [`ClientOption::DefaultHeader`] is invalid.
    pub fn option(self, option: ClientOption) -> Result<Self> {
        Ok(match option {
            ClientOption::RetryCount(count) => self.retry_count(count),
            ClientOption::Timeout(timeout) => self.timeout(timeout),
            ClientOption::Logger(logger) => self.logger(logger),
            ClientOption::Backoff(backoff) => self.backoff(backoff),
            ClientOption::DefaultHeader(name, value) => self.default_header(name, value)?,
        })
    }

    /// Validates the settings and produces the immutable configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no base URL was provided, or if
    /// the retry count or timeout is zero.
    pub fn build_config(self) -> Result<ClientConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Configuration("base URL is required".to_string()))?;

        if self.retry_count == 0 {
            return Err(Error::Configuration(
                "retry count must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(ClientConfig {
            base_url,
            credential: self.credential,
            retry_count: self.retry_count,
            timeout: self.timeout,
            backoff: self.backoff,
            default_headers: self.default_headers,
            logger: self.logger,
        })
    }

    /// Builds a client that talks to the network through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the configuration is invalid or
    /// the HTTP client cannot be initialised.
    pub fn build(self) -> Result<Client> {
        let config = self.build_config()?;
        let transport = ReqwestTransport::new(config.timeout()).map_err(|e| {
            Error::Configuration(format!("failed to build HTTP client: {}", e))
        })?;
        Ok(Client::from_parts(config, transport))
    }

    /// Builds a client that sends its requests through `transport`.
    ///
    /// The transport is responsible for enforcing the configured timeout.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Client<T>> {
        let config = self.build_config()?;
        Ok(Client::from_parts(config, transport))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientBuilder::new()
            .base_url("http://localhost:5001")
            .unwrap()
            .build_config()
            .unwrap();

        assert_eq!(config.retry_count(), 3);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.credential().is_none());
        assert!(matches!(config.backoff(), Backoff::Fixed { delay } if *delay == Duration::from_secs(2)));
    }

    #[test]
    fn test_missing_base_url() {
        let result = ClientBuilder::new().build_config();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_empty_and_invalid_base_url() {
        assert!(matches!(
            ClientBuilder::new().base_url("   "),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ClientBuilder::new().base_url("not a url"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ClientBuilder::new().base_url("mailto:ops@example.com"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_base_url_with_query_or_fragment_rejected() {
        for url in [
            "http://localhost:5001/api?tenant=acme",
            "http://localhost:5001/api#section",
            "http://localhost:5001/?",
        ] {
            assert!(
                matches!(ClientBuilder::new().base_url(url), Err(Error::Configuration(_))),
                "accepted {url}"
            );
        }

        let config = ClientBuilder::new()
            .base_url("http://localhost:5001/api/")
            .unwrap()
            .build_config()
            .unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:5001/api/");
    }

    #[test]
    fn test_error_messages_are_lowercase() {
        let errors = [
            ClientBuilder::new().api_key("line\nbreak").err(),
            ClientBuilder::new().default_header("bad name", "v").err(),
            ClientBuilder::new().default_header("x-ok", "bad\nvalue").err(),
            ClientBuilder::new().build_config().err(),
        ];

        for err in errors {
            match err {
                Some(Error::Configuration(message)) => {
                    assert!(message.starts_with(char::is_lowercase), "{message}");
                }
                other => panic!("Expected Configuration error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_zero_retry_count_and_timeout_rejected() {
        let builder = || ClientBuilder::new().base_url("http://localhost:5001").unwrap();

        assert!(matches!(
            builder().retry_count(0).build_config(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            builder().timeout(Duration::ZERO).build_config(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_options_apply_in_order() {
        let config = ClientBuilder::new()
            .base_url("http://localhost:5001")
            .unwrap()
            .option(ClientOption::RetryCount(7))
            .unwrap()
            .option(ClientOption::RetryCount(2))
            .unwrap()
            .option(ClientOption::Timeout(Duration::from_secs(1)))
            .unwrap()
            .build_config()
            .unwrap();

        assert_eq!(config.retry_count(), 2);
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_api_key() {
        let result = ClientBuilder::new().api_key("line\nbreak");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = ClientBuilder::new()
            .base_url("http://localhost:5001")
            .unwrap()
            .api_key("super-secret")
            .unwrap()
            .build_config()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (BASE_URL_ENV, "http://ledger.internal:5001"),
            (API_KEY_ENV, "key-1"),
        ]
        .into_iter()
        .collect();

        let config = ClientBuilder::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap()
            .build_config()
            .unwrap();

        assert_eq!(config.base_url().as_str(), "http://ledger.internal:5001/");
        assert_eq!(config.credential().unwrap(), "key-1");
    }

    #[test]
    fn test_from_lookup_requires_base_url() {
        let result = ClientBuilder::from_lookup(|_| None);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
