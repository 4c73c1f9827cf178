use crate::config::WebViewConfigError;

/// Failures of a pre-flight fetch.
///
/// None of these reach the caller of [`ManagedWebView::load`](crate::webview::ManagedWebView::load);
/// they select the fallback path instead.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("request has no URL")]
    MissingUrl,

    #[error("unsupported request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("session was invalidated")]
    Cancelled,

    #[error("redirect without a usable Location header")]
    InvalidRedirect,
}

#[derive(Debug, thiserror::Error)]
pub enum WebViewError {
    #[error("web view has been destroyed")]
    Closed,

    #[error("invalid configuration: {0}")]
    Config(#[from] WebViewConfigError),

    #[error("cannot create the pre-flight client: {0}")]
    Client(#[from] NetError),

    #[error("no Tokio runtime available to run the web view")]
    NoRuntime,
}
