//! Live handle lifecycle
//!
//! A live handle is the session-only reference the media element plays from.
//! Every handle is created here and released here, exactly once.

use cadence_core::{Blob, ObjectUrl};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Handle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleStats {
    /// Handles created this session
    pub created: usize,
    /// Handles released this session
    pub released: usize,
    /// Handles currently live
    pub live: usize,
}

/// Registry of live handles
///
/// Each created handle is either still registered or released, never both
/// and never neither. Dropping the registry releases whatever is left.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    live: HashMap<ObjectUrl, Blob>,
    created: usize,
    released: usize,
}

impl HandleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new handle backed by `blob`
    pub fn create(&mut self, blob: Blob) -> ObjectUrl {
        let handle = ObjectUrl::generate();
        trace!(handle = %handle, bytes = blob.len(), "Created live handle");
        self.live.insert(handle.clone(), blob);
        self.created += 1;
        handle
    }

    /// Release a handle
    ///
    /// Returns `false` when the handle was already released or never issued
    /// by this registry.
    pub fn release(&mut self, handle: &ObjectUrl) -> bool {
        if self.live.remove(handle).is_some() {
            self.released += 1;
            trace!(handle = %handle, "Released live handle");
            true
        } else {
            false
        }
    }

    /// Release every live handle, returning how many were released
    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        self.released += count;
        if count > 0 {
            debug!(count, "Released all live handles");
        }
        count
    }

    /// Bytes behind a live handle
    pub fn resolve(&self, handle: &ObjectUrl) -> Option<&Blob> {
        self.live.get(handle)
    }

    /// Whether `handle` is currently live
    pub fn is_live(&self, handle: &ObjectUrl) -> bool {
        self.live.contains_key(handle)
    }

    /// Counters
    pub fn stats(&self) -> HandleStats {
        HandleStats {
            created: self.created,
            released: self.released,
            live: self.live.len(),
        }
    }
}

impl Drop for HandleRegistry {
    fn drop(&mut self) {
        self.release_all();
    }
}
