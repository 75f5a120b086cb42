//! Validation and decoding of transport responses.

use crate::{transport::TransportResponse, Error, Response, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Validates the status of `response` and decodes its JSON body into `T`.
///
/// The returned [`Response`] reports zero latency and a single attempt;
/// the client overwrites both with the figures of the whole call.
///
/// # Errors
///
/// * [`Error::Http`] if the status is not 2xx. The body is kept as text and,
///   when it is valid JSON, also as `error_payload`.
/// * [`Error::Deserialization`] if the status is 2xx but the body does not
///   decode into `T`.
pub fn decode<T>(response: TransportResponse) -> Result<Response<T>>
where
    T: DeserializeOwned,
{
    let TransportResponse {
        status,
        headers,
        body,
    } = response;
    let raw_body = String::from_utf8_lossy(&body).into_owned();

    if !status.is_success() {
        return Err(Error::Http {
            status,
            error_payload: serde_json::from_slice(&body).ok(),
            raw_response: raw_body,
            headers,
        });
    }

    match serde_json::from_slice::<T>(&body) {
        Ok(data) => Ok(Response::new(
            data,
            raw_body,
            status,
            headers,
            Duration::ZERO,
            1,
        )),
        Err(e) => Err(Error::Deserialization {
            raw_response: raw_body,
            serde_error: e.to_string(),
            status,
            headers,
        }),
    }
}

/// Like [`decode`], but writes the value into a caller-owned `target`.
///
/// `target` is left untouched when an error is returned.
pub fn decode_into<T>(response: TransportResponse, target: &mut T) -> Result<()>
where
    T: DeserializeOwned,
{
    *target = decode::<T>(response)?.data;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq, Default)]
    struct Balance {
        balance_id: String,
        currency: String,
        balance: i64,
    }

    const BALANCE: &str = r#"{"balance_id":"bln_1","currency":"USD","balance":1500}"#;

    #[test]
    fn test_decodes_success_body() {
        let response = decode::<Balance>(TransportResponse::new(StatusCode::OK, BALANCE)).unwrap();

        assert_eq!(response.data.balance_id, "bln_1");
        assert_eq!(response.data.balance, 1500);
        assert_eq!(response.raw_body, BALANCE);
        assert_eq!(response.status, StatusCode::OK);
    }

    #[test]
    fn test_client_error_keeps_error_payload() {
        let body = r#"{"error":"transaction not found"}"#;
        let result = decode::<Balance>(TransportResponse::new(StatusCode::NOT_FOUND, body));

        match result {
            Err(Error::Http {
                status,
                raw_response,
                error_payload,
                ..
            }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(raw_response, body);
                assert_eq!(error_payload.unwrap()["error"], "transaction not found");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_error_body_has_no_payload() {
        let result = decode::<Balance>(TransportResponse::new(StatusCode::BAD_REQUEST, "bad input"));

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.raw_response(), Some("bad input"));
        assert!(err.error_payload().is_none());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_json_is_deserialization_error() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-request-id", http::HeaderValue::from_static("req_abc"));
        let response =
            TransportResponse::new(StatusCode::OK, "{\"balance_id\":").with_headers(headers);

        let result = decode::<Balance>(response);

        match result {
            Err(Error::Deserialization {
                status,
                raw_response,
                headers,
                ..
            }) => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(raw_response, "{\"balance_id\":");
                assert_eq!(headers.get("x-request-id").unwrap(), "req_abc");
            }
            other => panic!("Expected Deserialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_into_writes_target() {
        let mut target = Balance::default();
        decode_into(TransportResponse::new(StatusCode::CREATED, BALANCE), &mut target).unwrap();

        assert_eq!(target.currency, "USD");
    }

    #[test]
    fn test_decode_into_leaves_target_on_error() {
        let mut target = Balance {
            balance_id: "keep".to_string(),
            ..Balance::default()
        };
        let result = decode_into(
            TransportResponse::new(StatusCode::UNPROCESSABLE_ENTITY, "{}"),
            &mut target,
        );

        assert!(result.is_err());
        assert_eq!(target.balance_id, "keep");
    }
}
