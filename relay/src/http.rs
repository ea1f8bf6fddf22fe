use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::errors::DeliveryError;

pub const SIGNATURE_HEADER: &str = "x-apple-signature";
pub const NOTIFICATION_TYPE_HEADER: &str = "x-apple-notification-type";

/// Headers forwarded from the inbound notification to every backend.
///
/// Both are optional on the inbound side and degrade to an empty value, so
/// backends always see the full header set.
#[derive(Clone, Debug)]
pub struct ForwardHeaders {
    pub signature: HeaderValue,
    pub notification_type: HeaderValue,
}

impl ForwardHeaders {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let passthrough = |name: &str| {
            request
                .headers()
                .get(name)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(""))
        };

        Self {
            signature: passthrough(SIGNATURE_HEADER),
            notification_type: passthrough(NOTIFICATION_TYPE_HEADER),
        }
    }
}

/// Sends one notification body to a single backend with a bounded timeout.
///
/// The timeout covers the entire request/response cycle: establishing the
/// connection, sending the request, and receiving the response head.
///
/// Classification of failures:
/// - elapsed timer => [`DeliveryError::Timeout`]
/// - connect failure => [`DeliveryError::Connection`]
/// - any other transport error => [`DeliveryError::Other`]
/// - non-2xx response => [`DeliveryError::HttpStatus`]
///
/// A 2xx response is a success; the response body is not inspected.
pub async fn post_to_backend(
    client: &Client<HttpConnector, Full<Bytes>>,
    backend_url: &Url,
    body: Bytes,
    headers: &ForwardHeaders,
    timeout_secs: u64,
) -> Result<StatusCode, DeliveryError> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(backend_url.as_str())
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .header(SIGNATURE_HEADER, headers.signature.clone())
        .header(NOTIFICATION_TYPE_HEADER, headers.notification_type.clone())
        .body(Full::new(body))
        .map_err(|e| DeliveryError::Other(format!("failed to build request: {e}")))?;

    let response = timeout(Duration::from_secs(timeout_secs), client.request(request))
        .await
        // Outer Err: tokio::time::timeout elapsed before the client finished
        .map_err(|_| DeliveryError::Timeout)?
        // Inner Err: the client itself failed (connect refused, reset, ...)
        .map_err(|e| {
            if e.is_connect() {
                DeliveryError::Connection
            } else {
                DeliveryError::Other(e.to_string())
            }
        })?;

    let status = response.status();
    if status.is_success() {
        Ok(status)
    } else {
        Err(DeliveryError::HttpStatus(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::spawn_backend;
    use hyper_util::rt::TokioExecutor;

    fn test_client() -> Client<HttpConnector, Full<Bytes>> {
        Client::builder(TokioExecutor::new()).build(HttpConnector::new())
    }

    fn empty_headers() -> ForwardHeaders {
        ForwardHeaders {
            signature: HeaderValue::from_static(""),
            notification_type: HeaderValue::from_static(""),
        }
    }

    #[test]
    fn test_forward_headers_passthrough_and_default() {
        let request = Request::builder()
            .uri("/webhook")
            .header(SIGNATURE_HEADER, "sig-value")
            .body(())
            .unwrap();

        let headers = ForwardHeaders::from_request(&request);
        assert_eq!(headers.signature, "sig-value");
        assert_eq!(headers.notification_type, "");
    }

    #[tokio::test]
    async fn test_post_success() {
        let backend = spawn_backend(StatusCode::OK).await;
        let client = test_client();

        let status = post_to_backend(
            &client,
            &backend.url(),
            Bytes::from_static(b"{\"notificationType\":\"TEST\"}"),
            &empty_headers(),
            5,
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(backend.hits(), 1);
        let (recorded_headers, recorded_body) = backend.last_request().unwrap();
        assert_eq!(recorded_headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(recorded_body.as_ref(), b"{\"notificationType\":\"TEST\"}");
    }

    #[tokio::test]
    async fn test_post_non_2xx_is_http_error() {
        let backend = spawn_backend(StatusCode::SERVICE_UNAVAILABLE).await;
        let client = test_client();

        let result = post_to_backend(
            &client,
            &backend.url(),
            Bytes::from_static(b"{}"),
            &empty_headers(),
            5,
        )
        .await;

        assert_eq!(result.unwrap_err(), DeliveryError::HttpStatus(503));
    }

    #[tokio::test]
    async fn test_post_connection_refused() {
        // Bind to grab a free port, then drop the listener so connects are refused
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = test_client();
        let backend_url = Url::parse(&format!("http://127.0.0.1:{port}/webhook")).unwrap();

        let result = post_to_backend(
            &client,
            &backend_url,
            Bytes::from_static(b"{}"),
            &empty_headers(),
            5,
        )
        .await;

        assert_eq!(result.unwrap_err(), DeliveryError::Connection);
    }

    #[tokio::test]
    async fn test_post_timeout() {
        let client = test_client();

        // Non-routable address (TEST-NET-1) to hold the connect until the timer fires
        let backend_url = Url::parse("http://192.0.2.1:9999/webhook").unwrap();

        let result = post_to_backend(
            &client,
            &backend_url,
            Bytes::from_static(b"{}"),
            &empty_headers(),
            1,
        )
        .await;

        assert_eq!(result.unwrap_err(), DeliveryError::Timeout);
    }
}
