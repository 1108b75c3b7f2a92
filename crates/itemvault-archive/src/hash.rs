//! Content fingerprints.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read buffer size used when hashing streams.
const CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 digest of a snapshot's bytes, as lowercase hex.
///
/// Used only to detect duplicate captures, not for integrity against an
/// adversary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint an in-memory buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Fingerprint a stream, reading it to the end in fixed-size chunks.
    ///
    /// Returns an error without a digest if the stream fails part way.
    pub async fn of_reader<R>(mut reader: R) -> std::io::Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Fingerprint the current content of a file.
    pub async fn of_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path).await?;
        Self::of_reader(file).await
    }

    /// Get the digest as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_known_digest() {
        let fp = Fingerprint::of_bytes(b"abc");
        assert_eq!(
            fp.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_input() {
        let fp = Fingerprint::of_bytes(b"");
        assert_eq!(
            fp.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_reader_matches_bytes_across_chunks() {
        // Larger than one chunk so the loop runs more than once
        let data: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        let from_reader = Fingerprint::of_reader(&data[..]).await.unwrap();
        assert_eq!(from_reader, Fingerprint::of_bytes(&data));
    }

    #[tokio::test]
    async fn test_file_fingerprint_is_deterministic() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        tokio::fs::write(&a, b"{\"x\":1}").await.unwrap();
        tokio::fs::write(&b, b"{\"x\":1}").await.unwrap();

        let fa = Fingerprint::of_file(&a).await.unwrap();
        let fb = Fingerprint::of_file(&b).await.unwrap();
        assert_eq!(fa, fb);
        assert_eq!(fa.as_str().len(), 64);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let result = Fingerprint::of_file(&dir.path().join("missing")).await;
        assert!(result.is_err());
    }
}
