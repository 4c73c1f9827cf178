use crate::engine::EngineCookieStoreHandle;
use async_trait::async_trait;
use bitflags::bitflags;
use std::sync::Arc;
use time::OffsetDateTime;

/// A handle to a website data store.
pub type WebsiteDataStoreHandle = Arc<dyn WebsiteDataStore + Send + Sync>;

bitflags! {
    /// Kinds of data an engine keeps per site.
    pub struct WebsiteDataTypes: u16 {
        const COOKIES                        = 0b0000_0001;
        const DISK_CACHE                     = 0b0000_0010;
        const OFFLINE_WEB_APPLICATION_CACHE  = 0b0000_0100;
        const MEMORY_CACHE                   = 0b0000_1000;
        const LOCAL_STORAGE                  = 0b0001_0000;
        const SESSION_STORAGE                = 0b0010_0000;
        const INDEXED_DB_DATABASES           = 0b0100_0000;
        const WEB_SQL_DATABASES              = 0b1000_0000;

        /// What a web view clears on teardown. Script-visible storage is kept.
        const SITE_DATA = Self::COOKIES.bits
            | Self::DISK_CACHE.bits
            | Self::OFFLINE_WEB_APPLICATION_CACHE.bits
            | Self::MEMORY_CACHE.bits;
    }
}

/// Engine-side storage for cookies, caches and script storage.
#[async_trait]
pub trait WebsiteDataStore: Send + Sync {
    /// The cookie store that belongs to this data store.
    fn cookie_store(&self) -> EngineCookieStoreHandle;

    /// `false` for ephemeral (private) stores.
    fn is_persistent(&self) -> bool;

    /// Removes data of `types` modified at or after `modified_since`.
    async fn remove_data(&self, types: WebsiteDataTypes, modified_since: OffsetDateTime);
}
