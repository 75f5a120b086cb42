//! Logical description of one API call.

use serde::Serialize;
use std::fmt;

/// The HTTP methods the Blnk API is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`: payload fields are sent as query parameters.
    Get,
    /// `POST`: payload is sent as a JSON body.
    Post,
    /// `PUT`: payload is sent as a JSON body.
    Put,
    /// `DELETE`: payload is sent as a JSON body.
    Delete,
}

impl HttpMethod {
    /// Returns the method as an [`http::Method`].
    pub fn as_http(self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }

    /// Returns the method name in upper case.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical call: endpoint, method and optional payload.
///
/// The endpoint is relative to the client's base URL. The payload type `P`
/// only needs to implement [`Serialize`]; the method decides whether it is
/// encoded as a query string or as a JSON body.
///
/// # Examples
///
/// ```
/// use blnk_http::{HttpMethod, RequestDescriptor};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct UpdateStatus {
///     status: &'static str,
/// }
///
/// let descriptor = RequestDescriptor::new(HttpMethod::Put, "transactions/inflight/txn_123")
///     .with_payload(UpdateStatus { status: "commit" });
///
/// assert_eq!(descriptor.method, HttpMethod::Put);
/// assert!(descriptor.payload.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RequestDescriptor<P = ()> {
    /// The HTTP method.
    pub method: HttpMethod,

    /// The endpoint path, relative to the base URL.
    pub endpoint: String,

    /// The request payload.
    pub payload: Option<P>,
}

impl RequestDescriptor<()> {
    /// Creates a descriptor without a payload.
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            payload: None,
        }
    }
}

impl<P: Serialize> RequestDescriptor<P> {
    /// Creates a descriptor carrying `payload`.
    pub fn with_body(method: HttpMethod, endpoint: impl Into<String>, payload: P) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            payload: Some(payload),
        }
    }

    /// Replaces the payload, changing the payload type if needed.
    pub fn with_payload<Q: Serialize>(self, payload: Q) -> RequestDescriptor<Q> {
        RequestDescriptor {
            method: self.method,
            endpoint: self.endpoint,
            payload: Some(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.as_http(), http::Method::DELETE);
    }

    #[test]
    fn test_with_payload_keeps_endpoint_and_method() {
        let descriptor = RequestDescriptor::new(HttpMethod::Post, "refund-transaction/txn_1")
            .with_payload(serde_json::json!({ "reason": "duplicate" }));

        assert_eq!(descriptor.endpoint, "refund-transaction/txn_1");
        assert_eq!(descriptor.method, HttpMethod::Post);
        assert_eq!(descriptor.payload.unwrap()["reason"], "duplicate");
    }
}
