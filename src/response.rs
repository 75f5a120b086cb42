//! Successful call results.
//!
//! A [`Response`] carries the decoded value together with what the server
//! sent and how long the call took across all attempts.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A decoded 2xx response.
///
/// # Examples
///
/// ```no_run
/// use blnk_http::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Ledger {
///     ledger_id: String,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), blnk_http::Error> {
/// let client = Client::builder()
///     .base_url("http://localhost:5001")?
///     .build()?;
///
/// let response = client.get::<Ledger>("ledgers/ldg_073f7ffe").await?;
///
/// println!("Ledger: {}", response.data.name);
/// println!("Status {} after {} attempt(s)", response.status, response.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response body.
    pub data: T,

    /// The response body as received.
    pub raw_body: String,

    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the start of the first attempt to the decoded response.
    pub latency: Duration,

    /// Attempts made, including the successful one.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    pub(crate) fn with_timing(mut self, latency: Duration, attempts: usize) -> Self {
        self.latency = latency;
        self.attempts = attempts;
        self
    }

    /// Maps the decoded value, keeping the response metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blnk_http::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     250_u64,
    ///     "250".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(12),
    ///     1,
    /// );
    ///
    /// let cents = response.map(|amount| amount * 100);
    /// assert_eq!(cents.data, 25_000);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Returns `true` if more than one attempt was needed.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
