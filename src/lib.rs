//! # blnk-http - resilient HTTP call layer for the Blnk ledger API
//!
//! `blnk-http` turns a logical call (endpoint, method, payload) into an HTTP
//! request, sends it with a bounded number of retries, and decodes the
//! response into a type of your choosing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use blnk_http::{Backoff, Client, ClientOption};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct BalanceFilter {
//!     currency: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct Balance {
//!     balance_id: String,
//!     balance: i64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), blnk_http::Error> {
//!     let client = Client::new(
//!         "http://localhost:5001",
//!         Some("blnk-secret"),
//!         [
//!             ClientOption::RetryCount(4),
//!             ClientOption::Backoff(Backoff::Exponential {
//!                 initial_delay: Duration::from_millis(200),
//!                 max_delay: Duration::from_secs(5),
//!                 jitter: true,
//!             }),
//!         ],
//!     )?;
//!
//!     // GET payloads become query parameters
//!     let filter = BalanceFilter { currency: "USD".to_string() };
//!     let balances = client
//!         .get_with_query::<_, Vec<Balance>>("balances", &filter)
//!         .await?;
//!     println!("{} balances in {:?}", balances.data.len(), balances.latency);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Wire format
//!
//! * `Content-Type: application/json` is sent on every request.
//! * `X-Blnk-Key: <api key>` is sent when the client has an API key.
//! * GET payloads are encoded as query parameters; all other methods send
//!   their payload as a JSON body.
//!
//! ## Retries
//!
//! Transport failures (connection errors, DNS failures, timeouts) and 5xx
//! responses are retried until the retry count is used up, waiting between
//! attempts according to the configured [`Backoff`]. 4xx responses and
//! bodies that fail to decode are returned at once. See [`Error`] for the
//! full taxonomy.
//!
//! ## Logging
//!
//! Retries and terminal failures are reported to the [`Logger`] given at
//! construction. The default, [`TracingLogger`], forwards to `tracing`.

mod client;
pub mod config;
mod decode;
mod descriptor;
mod error;
mod logger;
mod request;
mod response;
pub mod retry;
pub mod transport;

pub use client::Client;
pub use config::{ClientBuilder, ClientConfig, ClientOption};
pub use decode::{decode, decode_into};
pub use descriptor::{HttpMethod, RequestDescriptor};
pub use error::{Error, Result};
pub use logger::{Logger, TracingLogger};
pub use request::{build_request, API_KEY_HEADER};
pub use response::Response;
pub use retry::Backoff;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse};
