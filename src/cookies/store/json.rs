//! JSON-backed cookie store.
//!
//! `JsonCookieStore` keeps the native jar in a single pretty-printed JSON file.
//! Every [`persist`](CookieStore::persist) rewrites the whole file, which is fine
//! for the few hundred cookies a single app accumulates.
//!
//! A missing file loads as an empty jar. A corrupt file is reported as
//! [`CookieStoreError::Json`] and left untouched.
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::cookies::store::{CookieStore, CookieStoreError};
use crate::cookies::DefaultCookieJar;

/// On-disk representation of the native jar.
#[derive(Debug, Serialize, Deserialize)]
struct CookieStoreFile {
    version: u32,
    jar: DefaultCookieJar,
}

const FILE_VERSION: u32 = 1;

pub struct JsonCookieStore {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,
    /// Serializes writers so two snapshots never interleave on disk.
    write_lock: Mutex<()>,
}

impl JsonCookieStore {
    /// Creates a JSON cookie store at `path`. The file is created on first persist.
    pub fn new(path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CookieStore for JsonCookieStore {
    fn load(&self) -> Result<DefaultCookieJar, CookieStoreError> {
        if !self.path.exists() {
            return Ok(DefaultCookieJar::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let file: CookieStoreFile = serde_json::from_str(&contents)?;
        Ok(file.jar)
    }

    fn persist(&self, snapshot: &DefaultCookieJar) -> Result<(), CookieStoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let file = CookieStoreFile {
            version: FILE_VERSION,
            jar: snapshot.clone(),
        };
        let contents = serde_json::to_string_pretty(&file)?;

        // Write next to the target and rename, so readers never see half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn remove_all(&self) -> Result<(), CookieStoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
