// src/watch/memo.rs

use std::collections::HashMap;
use std::collections::hash_map::{Entry, IntoIter};

use crate::hash::Digest;

/// Digests computed during one check cycle.
///
/// An entry means "already hashed in this cycle"; it is a cache, not the
/// change baseline. A memo is created per `check` call and consumed when the
/// cycle commits, so nothing leaks into the next cycle.
#[derive(Debug, Default)]
pub struct HashMemo {
    digests: HashMap<String, Digest>,
}

impl HashMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uri: &str) -> Option<&Digest> {
        self.digests.get(uri)
    }

    /// Return the memoized digest for `uri`, computing it on a miss.
    ///
    /// A failed computation is not memoized.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        uri: &str,
        compute: impl FnOnce() -> Result<Digest, E>,
    ) -> Result<Digest, E> {
        match self.digests.entry(uri.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let digest = compute()?;
                Ok(entry.insert(digest).clone())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.digests.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for HashMemo {
    type Item = (String, Digest);
    type IntoIter = IntoIter<String, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.digests.into_iter()
    }
}
