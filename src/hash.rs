// src/hash.rs

//! Content digests.

use std::fmt::Debug;
use std::io::{self, Read};

use blake3::Hasher;

/// Content-derived fingerprint of a resource (lowercase hex).
pub type Digest = String;

/// Turns a byte stream into a deterministic digest.
pub trait HashProvider: Send + Sync + Debug {
    /// Fails only when reading from `reader` fails.
    fn hash(&self, reader: &mut dyn Read) -> io::Result<Digest>;
}

/// blake3 over the full stream, read in 8 KiB chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3HashProvider;

impl HashProvider for Blake3HashProvider {
    fn hash(&self, reader: &mut dyn Read) -> io::Result<Digest> {
        let mut hasher = Hasher::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize().to_hex().to_string())
    }
}

/// Convenience for hashing an in-memory buffer.
pub fn hash_bytes(provider: &dyn HashProvider, bytes: &[u8]) -> io::Result<Digest> {
    let mut cursor = io::Cursor::new(bytes);
    provider.hash(&mut cursor)
}
