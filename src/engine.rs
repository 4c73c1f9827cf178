// src/engine.rs
//! Embedded browser engine interfaces.
//!
//! The web view never renders anything itself. It talks to the system browser
//! engine through the traits in this module:
//!
//! - [`EngineCookieStore`]: the engine's own, asynchronous cookie jar.
//! - [`WebsiteDataStore`]: owner of the engine cookie store and cached site data.
//! - [`WebEngine`]: an engine instance with its real navigation loader.
//! - [`EngineFactory`]: creates an engine instance for a web view.
//!
//! [`headless`] provides in-memory implementations for tests and for hosts
//! that only need the cookie bookkeeping.

mod configuration;
mod cookie_store;
mod data_store;
pub mod headless;
mod web_engine;

pub use configuration::{ContentMode, EngineConfiguration, InjectionTime, ProcessPool, UserContentController, UserScript};
pub use cookie_store::{EngineCookieStore, EngineCookieStoreHandle};
pub use data_store::{WebsiteDataStore, WebsiteDataStoreHandle, WebsiteDataTypes};
pub use web_engine::{EngineFactory, NavigationId, WebEngine, WebEngineHandle};
