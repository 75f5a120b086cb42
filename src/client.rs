//! Blnk API client with bounded retries.
//!
//! The [`Client`] type is the main entry point for making calls. Use
//! [`Client::new`] with a list of [`ClientOption`]s or [`Client::builder`]
//! to configure one.

use crate::{
    config::{ClientBuilder, ClientConfig, ClientOption},
    decode::decode,
    descriptor::{HttpMethod, RequestDescriptor},
    request::build_request,
    transport::{ReqwestTransport, Transport},
    Error, Response, Result,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// A client for the Blnk API.
///
/// Every call is retried while it fails transiently (transport errors and
/// 5xx responses), up to the configured retry count. Client errors and
/// undecodable responses end the call on the attempt that produced them.
///
/// Cloning is cheap: clones share the configuration and the transport's
/// connection pool.
///
/// # Examples
///
/// ```no_run
/// use blnk_http::{Client, ClientOption, Response};
/// use serde::{Deserialize, Serialize};
/// use std::time::Duration;
///
/// #[derive(Serialize)]
/// struct CreateLedger {
///     name: String,
/// }
///
/// #[derive(Deserialize)]
/// struct Ledger {
///     ledger_id: String,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), blnk_http::Error> {
/// let client = Client::new(
///     "http://localhost:5001",
///     Some("blnk-secret"),
///     [
///         ClientOption::RetryCount(5),
///         ClientOption::Timeout(Duration::from_secs(30)),
///     ],
/// )?;
///
/// let created: Response<Ledger> = client
///     .post("ledgers", &CreateLedger { name: "Customer wallets".to_string() })
///     .await?;
/// println!("Created ledger {}", created.data.ledger_id);
///
/// let fetched: Response<Ledger> = client.get("ledgers/ldg_073f7ffe").await?;
/// println!("Fetched {} after {} attempt(s)", fetched.data.name, fetched.attempts);
/// # Ok(())
/// # }
/// ```
pub struct Client<T = ReqwestTransport> {
    inner: Arc<ClientInner<T>>,
}

struct ClientInner<T> {
    config: ClientConfig,
    transport: T,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for `base_url`, then applies `options` in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL is missing or
    /// invalid, the API key is not a valid header value, or an option is
    /// out of range.
    pub fn new<I>(base_url: impl AsRef<str>, api_key: Option<&str>, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = ClientOption>,
    {
        configure(base_url, api_key, options)?.build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T: Transport> Client<T> {
    /// Like [`Client::new`], but sends requests through `transport`.
    pub fn with_transport<I>(
        base_url: impl AsRef<str>,
        api_key: Option<&str>,
        options: I,
        transport: T,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = ClientOption>,
    {
        configure(base_url, api_key, options)?.build_with_transport(transport)
    }

    pub(crate) fn from_parts(config: ClientConfig, transport: T) -> Self {
        Self {
            inner: Arc::new(ClientInner { config, transport }),
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The transport requests are sent through.
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Executes one logical call, retrying transient failures.
    ///
    /// Each attempt builds the request afresh, sends it, and decodes the
    /// response into `R`:
    ///
    /// * a build failure is returned immediately;
    /// * a transport failure or 5xx response is logged and, if attempts
    ///   remain, retried after the configured backoff;
    /// * any other non-2xx response or an undecodable body is returned
    ///   immediately, carrying the response details.
    ///
    /// No backoff is applied after the last attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetryExhausted`] when every attempt failed
    /// transiently, or the permanent error that ended the call.
    pub async fn execute<P, R>(&self, descriptor: &RequestDescriptor<P>) -> Result<Response<R>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let config = &self.inner.config;
        let logger = config.logger();
        let retry_count = config.retry_count();
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let request = build_request(descriptor, config)?;

            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt,
                "Executing HTTP request"
            );

            let error = match self.inner.transport.send(request).await {
                Ok(response) => {
                    let status = response.status;
                    match decode::<R>(response) {
                        Ok(decoded) => {
                            return Ok(decoded.with_timing(start_time.elapsed(), attempt));
                        }
                        Err(e) if e.is_retryable() => {
                            logger.error(&format!(
                                "Request failed with status code {} and Status {}",
                                status.as_u16(),
                                status
                            ));
                            e
                        }
                        Err(e) => {
                            logger.error(&e.to_string());
                            return Err(e);
                        }
                    }
                }
                Err(e) => {
                    logger.info(&e.to_string());
                    Error::Transport(e)
                }
            };

            if attempt >= retry_count {
                logger.error(&format!(
                    "max retry count exceeded after {} attempts",
                    attempt
                ));
                return Err(Error::RetryExhausted {
                    attempts: attempt,
                    last_error: Box::new(error),
                });
            }

            let delay = config.backoff().delay_for_attempt(attempt);
            tracing::debug!(
                delay_ms = delay.as_millis() as u64,
                attempt = attempt,
                "Retrying request after delay"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Executes `descriptor` and writes the decoded value into `target`.
    ///
    /// `target` is only written when the call succeeds.
    pub async fn execute_into<P, R>(
        &self,
        descriptor: &RequestDescriptor<P>,
        target: &mut R,
    ) -> Result<Response<()>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let response = self.execute::<P, R>(descriptor).await?;
        Ok(response.map(|data| *target = data))
    }

    /// Makes a GET request to `endpoint`.
    pub async fn get<R>(&self, endpoint: impl Into<String>) -> Result<Response<R>>
    where
        R: DeserializeOwned,
    {
        let descriptor = RequestDescriptor::new(HttpMethod::Get, endpoint);
        self.execute(&descriptor).await
    }

    /// Makes a GET request to `endpoint` with `query` encoded as query
    /// parameters.
    pub async fn get_with_query<Q, R>(
        &self,
        endpoint: impl Into<String>,
        query: &Q,
    ) -> Result<Response<R>>
    where
        Q: Serialize,
        R: DeserializeOwned,
    {
        let descriptor = RequestDescriptor::with_body(HttpMethod::Get, endpoint, query);
        self.execute(&descriptor).await
    }

    /// Makes a POST request to `endpoint` with a JSON body.
    pub async fn post<B, R>(&self, endpoint: impl Into<String>, body: &B) -> Result<Response<R>>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let descriptor = RequestDescriptor::with_body(HttpMethod::Post, endpoint, body);
        self.execute(&descriptor).await
    }

    /// Makes a PUT request to `endpoint` with a JSON body.
    pub async fn put<B, R>(&self, endpoint: impl Into<String>, body: &B) -> Result<Response<R>>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let descriptor = RequestDescriptor::with_body(HttpMethod::Put, endpoint, body);
        self.execute(&descriptor).await
    }

    /// Makes a DELETE request to `endpoint`.
    pub async fn delete<R>(&self, endpoint: impl Into<String>) -> Result<Response<R>>
    where
        R: DeserializeOwned,
    {
        let descriptor = RequestDescriptor::new(HttpMethod::Delete, endpoint);
        self.execute(&descriptor).await
    }
}

fn configure<I>(base_url: impl AsRef<str>, api_key: Option<&str>, options: I) -> Result<ClientBuilder>
where
    I: IntoIterator<Item = ClientOption>,
{
    let mut builder = ClientBuilder::new().base_url(base_url)?;
    if let Some(key) = api_key {
        builder = builder.api_key(key)?;
    }
    for option in options {
        builder = builder.option(option)?;
    }
    Ok(builder)
}
