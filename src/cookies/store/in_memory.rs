use std::sync::{Arc, PoisonError, RwLock};

use crate::cookies::store::{CookieStore, CookieStoreError};
use crate::cookies::DefaultCookieJar;

/// Cookie store that keeps the last snapshot in memory.
#[derive(Default)]
pub struct InMemoryCookieStore {
    snapshot: RwLock<Option<DefaultCookieJar>>,
}

impl InMemoryCookieStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl CookieStore for InMemoryCookieStore {
    fn load(&self) -> Result<DefaultCookieJar, CookieStoreError> {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Ok(snapshot.clone().unwrap_or_default())
    }

    fn persist(&self, snapshot: &DefaultCookieJar) -> Result<(), CookieStoreError> {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }

    fn remove_all(&self) -> Result<(), CookieStoreError> {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
