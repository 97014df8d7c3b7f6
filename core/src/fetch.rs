//! Data-fetch collaborator contract.
//!
//! The engine defines no timeout: a fetch that never resolves stalls the
//! preload pass, and with it `reset`. Timeouts belong to implementations.

use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fetches raw asset data by identifier.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    /// Raw bytes for `id`.
    ///
    /// # Errors
    /// - `FetchError` with `fatal = true` aborts the preload pass
    /// - `FetchError` with `fatal = false` only skips this asset
    async fn fetch_data(&self, id: &str) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<T: DataFetcher + ?Sized> DataFetcher for Arc<T> {
    async fn fetch_data(&self, id: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_data(id).await
    }
}

/// In-memory fetcher that counts every request.
///
/// Unknown ids resolve to empty data unless `strict` is set, in which
/// case they fail with a fatal `FetchError`.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
    failures: HashMap<String, FetchError>,
    strict: bool,
    fetches: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_file(mut self, id: &str, data: impl Into<Vec<u8>>) -> Self {
        self.files.insert(id.to_string(), data.into());
        self
    }

    pub fn with_failure(mut self, id: &str, error: FetchError) -> Self {
        self.failures.insert(id.to_string(), error);
        self
    }

    /// Total number of `fetch_data` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Every requested id, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DataFetcher for MemoryFetcher {
    async fn fetch_data(&self, id: &str) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.log.lock() {
            log.push(id.to_string());
        }
        if let Some(error) = self.failures.get(id) {
            return Err(error.clone());
        }
        match self.files.get(id) {
            Some(data) => Ok(data.clone()),
            None if self.strict => Err(FetchError::not_found(id)),
            None => Ok(Vec::new()),
        }
    }
}
