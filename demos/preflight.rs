//! Pre-flights a URL through a managed web view backed by the headless engine.
//!
//! ```text
//! RUST_LOG=debug cargo run --example preflight -- https://example.com/
//! ```
//!
//! Native cookies are kept in `managed-webview-cookies.json` in the system
//! temp directory, so a second run starts with the cookies of the first.
use anyhow::Context;
use managed_webview::config::WebViewConfig;
use managed_webview::cookies::{JsonCookieStore, PersistentCookieJar};
use managed_webview::engine::headless::{HeadlessEngineFactory, InMemoryWebsiteDataStore};
use managed_webview::net::Request;
use managed_webview::rect::Rect;
use managed_webview::{CookieSynchronizer, ManagedWebView};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let url = std::env::args().nth(1).unwrap_or_else(|| "https://example.com/".to_string());
    let request = Request::parse(&url).with_context(|| format!("invalid url {url}"))?;

    let store = JsonCookieStore::new(std::env::temp_dir().join("managed-webview-cookies.json"));
    let jar = PersistentCookieJar::open(store).context("cannot load native cookies")?;
    let sync = CookieSynchronizer::new(jar.into(), InMemoryWebsiteDataStore::new());

    let config = WebViewConfig::builder()
        .user_agent("managed-webview-demo/0.1")
        .clear_site_data_on_drop(false)
        .build()?;

    let factory = HeadlessEngineFactory::new();
    let view = ManagedWebView::builder(Rect::sized(390, 844), sync.clone())
        .config(config)
        .build(&factory)?;
    let engine = factory.last().context("no engine was created")?;

    view.update_handlers(|h| {
        h.on_did_finish_navigation(|nav| log::info!("finished navigation {nav:?}"));
    });

    view.load(request);
    let loads = tokio::time::timeout(Duration::from_secs(30), engine.wait_for_loads(1))
        .await
        .context("pre-flight did not finish")?;

    let handed = &loads[0];
    println!(
        "engine loads: {}",
        handed.url.as_ref().map(|u| u.as_str()).unwrap_or("<no url>")
    );
    println!("cookie header: {}", handed.cookie_header().unwrap_or("<none>"));
    println!("native cookies: {}", sync.native_cookies().len());

    engine.delegate().did_finish_navigation(None).await;
    view.close().await;
    Ok(())
}
