//! Turns a [`RequestDescriptor`] into a [`TransportRequest`].

use crate::{
    config::ClientConfig,
    descriptor::{HttpMethod, RequestDescriptor},
    transport::TransportRequest,
    Error, Result,
};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

/// Header carrying the API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-blnk-key");

/// Builds the transport request for one attempt of `descriptor`.
///
/// GET payloads are encoded as query parameters in field order and never
/// produce a body. Payloads of every other method are encoded as a JSON body
/// and never touch the query string. `Content-Type: application/json` is
/// always set, and `X-Blnk-Key` is set whenever the client has a credential.
///
/// # Errors
///
/// Returns [`Error::RequestBuild`] if the endpoint does not resolve to a
/// valid URL or the payload cannot be encoded.
///
/// # Examples
///
/// ```
/// use blnk_http::{build_request, ClientBuilder, HttpMethod, RequestDescriptor};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Filter {
///     currency: &'static str,
///     limit: u32,
/// }
///
/// let config = ClientBuilder::new()
///     .base_url("http://localhost:5001")?
///     .build_config()?;
///
/// let descriptor = RequestDescriptor::with_body(
///     HttpMethod::Get,
///     "balances",
///     Filter { currency: "USD", limit: 10 },
/// );
/// let request = build_request(&descriptor, &config)?;
///
/// assert_eq!(request.url.as_str(), "http://localhost:5001/balances?currency=USD&limit=10");
/// assert!(request.body.is_none());
/// # Ok::<(), blnk_http::Error>(())
/// ```
pub fn build_request<P: Serialize>(
    descriptor: &RequestDescriptor<P>,
    config: &ClientConfig,
) -> Result<TransportRequest> {
    let mut url = resolve_endpoint(config.base_url(), &descriptor.endpoint)?;
    let mut body = None;

    if let Some(payload) = &descriptor.payload {
        match descriptor.method {
            HttpMethod::Get => append_query(&mut url, payload)?,
            _ => {
                let json = serde_json::to_vec(payload).map_err(|e| {
                    Error::RequestBuild(format!("Failed to serialize request body: {}", e))
                })?;
                body = Some(Bytes::from(json));
            }
        }
    }

    let mut headers = config.default_headers().clone();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(credential) = config.credential() {
        headers.insert(API_KEY_HEADER, credential.clone());
    }

    Ok(TransportRequest {
        method: descriptor.method.as_http(),
        url,
        headers,
        body,
    })
}

/// Joins `endpoint` onto `base` with exactly one `/` between them.
fn resolve_endpoint(base: &Url, endpoint: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|e| Error::RequestBuild(format!("Invalid request URL {joined:?}: {e}")))
}

fn append_query<P: Serialize>(url: &mut Url, payload: &P) -> Result<()> {
    let encoded = serde_urlencoded::to_string(payload).map_err(|e| {
        Error::RequestBuild(format!("Failed to encode query parameters: {}", e))
    })?;
    if encoded.is_empty() {
        return Ok(());
    }

    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
        _ => encoded,
    };
    url.set_query(Some(&query));
    Ok(())
}
