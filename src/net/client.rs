use crate::errors::NetError;
use crate::net::{CachePolicy, Request, Response};
use async_trait::async_trait;
use http::header::{CACHE_CONTROL, PRAGMA};
use http::HeaderValue;
use std::sync::Arc;

/// A handle to the transport used for pre-flight fetches.
pub type HttpClientHandle = Arc<dyn HttpClient + Send + Sync>;

/// Transport for pre-flight fetches.
///
/// Implementations must **not** follow redirects: 3xx responses are returned
/// as-is so the web view can re-attach cookies before following them.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, NetError>;
}

/// `reqwest` backed transport with automatic redirects and cookie handling disabled.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, NetError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client. It must have been built with `redirect::Policy::none()`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    // Loads a request and returns the buffered response
    async fn execute(&self, request: Request) -> Result<Response, NetError> {
        let url = request.url.clone().ok_or(NetError::MissingUrl)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetError::InvalidRequest(format!("scheme {} cannot be fetched", url.scheme())));
        }

        let mut headers = request.headers.clone();
        if request.cache_policy == CachePolicy::ReloadIgnoringCacheData {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers)
            .body(request.body.clone());
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let res = builder.send().await.map_err(map_transport)?;

        // Fetch results
        let final_url = res.url().clone();
        let status = res.status().as_u16();
        let status_text = res.status().canonical_reason().unwrap_or("Unknown").to_string();
        let headers = res.headers().clone();

        // Fetch body. We don't do streaming
        let body = res.bytes().await.map_err(map_transport)?.to_vec();

        Ok(Response {
            url: final_url,
            status,
            status_text,
            headers,
            body,
        })
    }
}

fn map_transport(e: reqwest::Error) -> NetError {
    if e.is_timeout() {
        NetError::Timeout
    } else {
        NetError::Transport(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_url_fails_before_any_io() {
        let client = ReqwestClient::new().unwrap();
        let err = client.execute(Request::empty()).await.unwrap_err();
        assert!(matches!(err, NetError::MissingUrl));
    }

    #[tokio::test]
    async fn non_http_schemes_are_rejected() {
        let client = ReqwestClient::new().unwrap();
        let err = client.execute(Request::parse("file:///etc/hosts").unwrap()).await.unwrap_err();
        assert!(matches!(err, NetError::InvalidRequest(_)));
    }
}
