//! Networking used for navigation pre-flight.
//!
//! - [`Request`] / [`Response`]: plain request and fully buffered response models.
//! - [`HttpClient`]: the transport seam; [`ReqwestClient`] is the production implementation.
//! - [`BackgroundSession`]: a cancellable session owned by a single web view.
//! - [`SessionSlot`]: the "at most one active session" slot of a web view.

mod client;
mod request;
mod response;
mod session;

pub use client::{HttpClient, HttpClientHandle, ReqwestClient};
pub use request::{CachePolicy, Request};
pub use response::Response;
pub use session::{BackgroundSession, SessionSlot};
