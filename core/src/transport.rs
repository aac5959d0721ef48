//! External collaborators: the byte transport and the authentication hook.
//!
//! # Design
//! The dispatch core only needs "send this envelope, give me status, headers
//! and bytes back". [`Transport`] is that seam; connection pooling, TLS and
//! DNS live behind it. Dropping the future returned by [`Transport::send`]
//! abandons the attempt, which is how timeouts and cancellation release it.
//! [`ReqwestTransport`] is the production implementation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Class of network-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Reset,
    Dns,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Reset => "connection reset",
            TransportErrorKind::Dns => "name resolution failed",
            TransportErrorKind::Other => "transport failure",
        };
        f.write_str(s)
    }
}

/// A request never produced an HTTP response.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Sends one resolved request and returns the raw response.
///
/// Implementations must return every HTTP status as `Ok`; only failures to
/// obtain a response at all are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Produces per-request authentication headers.
///
/// Invoked once per request before the transport is touched; an `Err`
/// aborts the call with [`crate::ApiError::Auth`].
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn headers(&self) -> Result<Vec<(String, String)>, String>;
}

/// Adds no headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl AuthProvider for NoAuth {
    async fn headers(&self) -> Result<Vec<(String, String)>, String> {
        Ok(Vec::new())
    }
}

/// Static bearer token. An empty token fails every request.
#[derive(Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AuthProvider for BearerToken {
    async fn headers(&self) -> Result<Vec<(String, String)>, String> {
        if self.token.is_empty() {
            return Err("auth token not set".to_string());
        }
        Ok(vec![("Authorization".to_string(), format!("Bearer {}", self.token))])
    }
}

/// [`Transport`] over a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(classify)?.to_vec();
        Ok(HttpResponse { status, headers, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    let kind = if err.is_connect() {
        let text = format!("{err:?}").to_ascii_lowercase();
        if text.contains("dns") || text.contains("resolve") {
            TransportErrorKind::Dns
        } else {
            TransportErrorKind::Connect
        }
    } else if err.is_body() || err.is_request() {
        TransportErrorKind::Reset
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, err.to_string()).with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bearer_token_produces_authorization_header() {
        let headers = BearerToken::new("abc").headers().await.unwrap();
        assert_eq!(headers, vec![("Authorization".to_string(), "Bearer abc".to_string())]);
    }

    #[tokio::test]
    async fn empty_token_is_an_auth_failure() {
        assert!(BearerToken::new("").headers().await.is_err());
    }

    #[test]
    fn token_is_not_logged() {
        assert!(!format!("{:?}", BearerToken::new("secret")).contains("secret"));
    }

    #[tokio::test]
    async fn connection_refused_is_a_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = ReqwestTransport::new()
            .send(HttpRequest {
                method: HttpMethod::Get,
                url: format!("http://{addr}/api/server"),
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connect);
    }
}
