pub mod config;
pub mod cookies;
pub mod engine;
pub mod errors;
pub mod events;
pub mod net;
pub mod rect;
pub mod sync;
pub mod webview;

pub use sync::CookieSynchronizer;
pub use webview::{HandlerTable, ManagedWebView, NavigationDelegate, WebViewBuilder};
