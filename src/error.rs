//! Error types for Blnk API calls.
//!
//! Every failure a call can end in is a variant of [`Error`]. Variants that
//! come from a received response keep the status, headers and raw body so
//! callers can inspect what the server actually said.

use http::{HeaderMap, StatusCode};

use crate::transport::TransportError;

/// The main error type for Blnk API calls.
///
/// Failures fall into three classes:
///
/// * **fatal**: [`Error::Configuration`], raised while building a client;
/// * **transient**: [`Error::Transport`] and 5xx [`Error::Http`], retried by
///   the client while the retry budget lasts;
/// * **permanent**: [`Error::RequestBuild`], non-5xx [`Error::Http`] and
///   [`Error::Deserialization`], returned on the attempt that produced them.
///
/// [`Error::RetryExhausted`] is returned when every attempt failed transiently.
///
/// # Examples
///
/// ```no_run
/// use blnk_http::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("http://localhost:5001")?
///     .build()?;
///
/// match client.get::<serde_json::Value>("ledgers").await {
///     Ok(response) => println!("Ledgers: {:?}", response.data),
///     Err(Error::Http { status, error_payload: Some(payload), .. }) => {
///         eprintln!("Rejected with {status}: {payload}");
///     }
///     Err(Error::RetryExhausted { attempts, last_error }) => {
///         eprintln!("Gave up after {attempts} attempts: {last_error}");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client configuration is invalid.
    ///
    /// Returned only while constructing a client: missing or unparsable base
    /// URL, a zero retry count or timeout, or an invalid header value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request could not be built from its descriptor.
    ///
    /// Covers an unparsable combined URL and payloads that cannot be encoded
    /// as a JSON body or as query parameters. Never retried.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// The transport failed to deliver the request or read the response.
    ///
    /// Connection failures, DNS failures and timeouts all land here.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status code.
    ///
    /// # Fields
    ///
    /// * `status` - The HTTP status code
    /// * `raw_response` - The raw response body
    /// * `headers` - The response headers
    /// * `error_payload` - The body parsed as JSON, when it is valid JSON
    #[error("HTTP error {status}: {raw_response}")]
    Http {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
        /// The error document sent by the server, if it parsed as JSON
        error_payload: Option<serde_json::Value>,
    },

    /// The response had a success status but its body did not decode into
    /// the expected type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    Deserialization {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
        /// The response headers
        headers: HeaderMap,
    },

    /// Every attempt in the retry budget failed with a transient error.
    ///
    /// `last_error` is the failure of the final attempt.
    #[error("Max retry count exceeded after {attempts} attempts: {last_error}")]
    RetryExhausted {
        /// The number of attempts made
        attempts: usize,
        /// The error of the last attempt
        last_error: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if this error is transient and the call may be retried.
    ///
    /// Only transport failures and 5xx responses are retryable. Client errors
    /// (4xx) are not, and neither is anything raised before or after the
    /// exchange with the server.
    ///
    /// # Examples
    ///
    /// ```
    /// use blnk_http::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::Http {
    ///     status: StatusCode::BAD_GATEWAY,
    ///     raw_response: String::new(),
    ///     headers: http::HeaderMap::new(),
    ///     error_payload: None,
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Http {
    ///     status: StatusCode::TOO_MANY_REQUESTS,
    ///     raw_response: String::new(),
    ///     headers: http::HeaderMap::new(),
    ///     error_payload: None,
    /// };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Http { status, .. } => status.is_server_error(),
            Error::Configuration(_)
            | Error::RequestBuild(_)
            | Error::Deserialization { .. }
            | Error::RetryExhausted { .. } => false,
        }
    }

    /// Returns the HTTP status code if this error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Deserialization { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error came from a response.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Http { raw_response, .. } => Some(raw_response),
            Error::Deserialization { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the response headers if this error came from a response.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Error::Http { headers, .. } => Some(headers),
            Error::Deserialization { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// Returns the JSON error document of a non-2xx response, if it had one.
    pub fn error_payload(&self) -> Option<&serde_json::Value> {
        match self {
            Error::Http { error_payload, .. } => error_payload.as_ref(),
            _ => None,
        }
    }
}

/// A specialized `Result` type for Blnk API calls.
pub type Result<T> = std::result::Result<T, Error>;
