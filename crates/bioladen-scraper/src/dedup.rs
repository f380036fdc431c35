//! Identity keys and the run-scoped seen-set.

use std::collections::HashSet;
use std::sync::Mutex;

use bioladen_core::{DedupMode, StoreRecord};
use sha2::{Digest, Sha256};

/// Derives the identity key for `record` under `mode`.
///
/// An empty key means the record carries no usable identity for this mode.
#[must_use]
pub fn identity_key(record: &StoreRecord, mode: DedupMode) -> String {
    match mode {
        DedupMode::DetailUrl => record
            .detail_url
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase(),
        DedupMode::Composite => {
            let name = record.name.as_deref().unwrap_or_default().trim().to_lowercase();
            let street = record
                .street
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_lowercase();
            let postal_code = record.postal_code.as_deref().unwrap_or_default().trim();
            if name.is_empty() && street.is_empty() && postal_code.is_empty() {
                return String::new();
            }
            format!("{name}|{street}|{postal_code}")
        }
    }
}

/// Set of identity keys seen during one run.
///
/// Keys are stored as SHA-256 digests so long detail links do not dominate
/// memory on large runs. Shared across tasks behind an `Arc`; every
/// check-and-insert happens under one lock, so two tasks racing on the same
/// key cannot both see it as new.
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: Mutex<HashSet<[u8; 32]>>,
}

impl DedupIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index pre-populated with keys from an earlier run.
    #[must_use]
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = Self::new();
        for key in keys {
            index.insert(key.as_ref());
        }
        index
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.lock().contains(&digest(key))
    }

    /// Records `key`. Returns `true` if it was not present before.
    ///
    /// Empty keys are never stored and always report `true`.
    pub fn insert(&self, key: &str) -> bool {
        if key.is_empty() {
            return true;
        }
        self.lock().insert(digest(key))
    }

    /// Forgets `key`. Returns `true` if it was present.
    pub fn remove(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.lock().remove(&digest(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<[u8; 32]>> {
        // A panic while holding the lock cannot leave the set half-updated.
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn digest(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}

/// Applies one [`DedupMode`] against a shared [`DedupIndex`].
#[derive(Debug)]
pub struct RecordDeduplicator<'a> {
    mode: DedupMode,
    index: &'a DedupIndex,
}

impl<'a> RecordDeduplicator<'a> {
    #[must_use]
    pub fn new(mode: DedupMode, index: &'a DedupIndex) -> Self {
        Self { mode, index }
    }

    #[must_use]
    pub fn mode(&self) -> DedupMode {
        self.mode
    }

    /// `true` if a record with the same identity key was already seen.
    ///
    /// First sight of a key records it. Records with an empty key are never
    /// duplicates and are not recorded.
    #[must_use]
    pub fn is_duplicate(&self, record: &StoreRecord) -> bool {
        let key = identity_key(record, self.mode);
        !self.index.insert(&key)
    }

    /// Undoes the claim [`Self::is_duplicate`] made for `record`, for a
    /// record that was never kept.
    pub fn release(&self, record: &StoreRecord) {
        self.index.remove(&identity_key(record, self.mode));
    }
}
