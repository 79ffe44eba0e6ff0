// Content fingerprints using BLAKE3

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::constants::{HASH_ALGORITHM, HASH_CHUNK_SIZE};
use crate::error::{Result, ShotDeckError};

/// 256-bit digest of a file's raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hex digest.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// Digest tagged with its algorithm, e.g. `blake3:9f86...`.
    pub fn labeled(&self) -> String {
        format!("{}:{}", HASH_ALGORITHM, self.to_hex())
    }
}

impl From<blake3::Hash> for Fingerprint {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.labeled())
    }
}

/// Fingerprint an entire file, streamed in 1MB chunks.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint> {
    let mut file = File::open(path)
        .map_err(|e| ShotDeckError::Hash(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ShotDeckError::Hash(format!("Failed to read {}: {}", path.display(), e)))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().into())
}

/// Fingerprint an in-memory byte slice.
pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    blake3::hash(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_matches_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Hello, World!").unwrap();

        let from_file = fingerprint_file(file.path()).unwrap();
        assert_eq!(from_file, fingerprint_bytes(b"Hello, World!"));
    }

    #[test]
    fn test_large_file_spans_chunks() {
        let data: Vec<u8> = (0..HASH_CHUNK_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();

        assert_eq!(fingerprint_file(file.path()).unwrap(), fingerprint_bytes(&data));
    }

    #[test]
    fn test_single_byte_difference() {
        assert_ne!(fingerprint_bytes(b"frame-a"), fingerprint_bytes(b"frame-b"));
    }

    #[test]
    fn test_missing_file_is_hash_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = fingerprint_file(&dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(err, ShotDeckError::Hash(_)));
    }

    #[test]
    fn test_labels() {
        let fp = fingerprint_bytes(b"");
        assert_eq!(fp.to_hex().len(), 64);
        assert!(fp.labeled().starts_with("blake3:"));
        assert_eq!(fp.to_string(), fp.to_hex());
    }
}
