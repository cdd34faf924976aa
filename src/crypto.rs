//! Hashing primitives for the blockchain demo

use sha2::{Digest, Sha256};
use std::io;

/// Raw 32-byte SHA-256 digest.
pub type Sha256Hash = [u8; 32];

/// Hashes arbitrary text and returns the lowercase hex digest.
///
/// This is the standalone "see how hashing works" utility; it has no
/// relationship to any ledger.
pub fn hash_text(text: &str) -> String {
    let digest: Sha256Hash = Sha256::digest(text.as_bytes()).into();
    hash_to_hex(&digest)
}

/// Convert a digest to a lowercase hex string for display.
pub fn hash_to_hex(hash: &Sha256Hash) -> String {
    hex::encode(hash)
}

/// An `io::Write` sink that feeds every byte into a SHA-256 hasher.
///
/// Lets serializers stream straight into the digest without an
/// intermediate buffer. Writes never fail.
#[derive(Default)]
pub struct HashWriter {
    hasher: Sha256,
}

impl HashWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finalize(self) -> Sha256Hash {
        self.hasher.finalize().into()
    }
}

impl io::Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
