//! Integrity hashes for downloaded files.
//!
//! Hashes are written as `<algorithm>:<hex digest>`, for example
//! `sha256:5891286b...`. A digest without a prefix is taken to be SHA-256.
//! Digests are compared case-insensitively.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha256, Sha512};

/// Read buffer size used while hashing files.
const CHUNK_SIZE: usize = 8192;

/// Errors arising from parsing a hash string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KnownHashError {
    /// The algorithm prefix is not one of the supported digests.
    #[error("unsupported hash algorithm '{algorithm}'")]
    UnsupportedAlgorithm {
        /// The prefix as written.
        algorithm: String,
    },

    /// The digest part is not a hex string of the right length.
    #[error("invalid {algorithm} digest: {reason}")]
    InvalidDigest {
        /// The algorithm the digest was checked against.
        algorithm: HashAlgorithm,
        /// Why the digest was rejected.
        reason: String,
    },
}

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256, the default when no prefix is given.
    Sha256,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// Prefix used in hash strings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Length of the hex-encoded digest.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Hash everything readable from `reader`, returning a lowercase hex
    /// digest.
    ///
    /// # Errors
    ///
    /// Propagates read failures.
    pub fn hash_reader(self, reader: impl Read) -> io::Result<String> {
        match self {
            Self::Sha256 => digest_hex::<Sha256>(reader),
            Self::Sha512 => digest_hex::<Sha512>(reader),
        }
    }

    /// Hash the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn hash_file(self, path: &Path) -> io::Result<String> {
        self.hash_reader(fs::File::open(path)?)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn digest_hex<D: Digest>(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect())
}

/// A parsed, validated integrity hash.
///
/// # Examples
///
/// ```
/// use auxdata_fetcher::known_hash::{HashAlgorithm, KnownHash};
///
/// let hash: KnownHash = format!("sha256:{}", "A".repeat(64)).parse().expect("valid hash");
/// assert_eq!(hash.algorithm(), HashAlgorithm::Sha256);
/// assert_eq!(hash.digest(), "a".repeat(64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KnownHash {
    algorithm: HashAlgorithm,
    digest: String,
}

impl KnownHash {
    /// Parse an algorithm-prefixed hash string.
    ///
    /// # Errors
    ///
    /// Returns [`KnownHashError`] for unknown algorithms and malformed
    /// digests.
    pub fn parse(value: &str) -> Result<Self, KnownHashError> {
        let trimmed = value.trim();
        let (algorithm, digest) = match trimmed.split_once(':') {
            Some((label, digest)) => {
                let algorithm = HashAlgorithm::from_label(label).ok_or_else(|| {
                    KnownHashError::UnsupportedAlgorithm {
                        algorithm: label.to_owned(),
                    }
                })?;
                (algorithm, digest)
            }
            None => (HashAlgorithm::Sha256, trimmed),
        };
        validate_digest(algorithm, digest)?;
        Ok(Self {
            algorithm,
            digest: digest.to_ascii_lowercase(),
        })
    }

    /// The digest algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The lowercase hex digest.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Whether `actual` (a hex digest from the same algorithm) matches.
    #[must_use]
    pub fn matches_digest(&self, actual: &str) -> bool {
        self.digest.eq_ignore_ascii_case(actual)
    }

    /// Hash the file at `path` and compare it with this hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn matches_file(&self, path: &Path) -> io::Result<bool> {
        let actual = self.algorithm.hash_file(path)?;
        Ok(self.matches_digest(&actual))
    }
}

impl FromStr for KnownHash {
    type Err = KnownHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KnownHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

fn validate_digest(algorithm: HashAlgorithm, digest: &str) -> Result<(), KnownHashError> {
    let expected = algorithm.hex_len();
    if digest.len() != expected {
        return Err(KnownHashError::InvalidDigest {
            algorithm,
            reason: format!("expected {expected} hex characters, got {}", digest.len()),
        });
    }
    if let Some(bad) = digest.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(KnownHashError::InvalidDigest {
            algorithm,
            reason: format!("non-hex character '{bad}'"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    /// SHA-256 of `hello world`.
    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn hashes_known_input() {
        let digest = HashAlgorithm::Sha256
            .hash_reader(Cursor::new(b"hello world"))
            .expect("in-memory read");
        assert_eq!(digest, HELLO_SHA256);
    }

    #[test]
    fn sha512_digest_has_expected_length() {
        let digest = HashAlgorithm::Sha512
            .hash_reader(Cursor::new(b"hello world"))
            .expect("in-memory read");
        assert_eq!(digest.len(), HashAlgorithm::Sha512.hex_len());
    }

    #[test]
    fn hashes_inputs_larger_than_one_chunk() {
        let data = vec![7u8; CHUNK_SIZE * 3 + 11];
        let streamed = HashAlgorithm::Sha256
            .hash_reader(Cursor::new(&data))
            .expect("in-memory read");
        let direct: String = Sha256::digest(&data)
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        assert_eq!(streamed, direct);
    }

    #[rstest]
    #[case::prefixed(format!("sha256:{HELLO_SHA256}"))]
    #[case::bare(HELLO_SHA256.to_owned())]
    #[case::uppercase(format!("SHA256:{}", HELLO_SHA256.to_uppercase()))]
    fn parses_sha256_forms(#[case] raw: String) {
        let hash = KnownHash::parse(&raw).expect("valid hash");
        assert_eq!(hash.algorithm(), HashAlgorithm::Sha256);
        assert_eq!(hash.digest(), HELLO_SHA256);
    }

    #[rstest]
    #[case::md5("md5:5eb63bbbe01eeed093cb22bb8f5acdc3")]
    #[case::blake("blake3:abcd")]
    fn rejects_unsupported_algorithms(#[case] raw: &str) {
        assert!(matches!(
            KnownHash::parse(raw),
            Err(KnownHashError::UnsupportedAlgorithm { .. })
        ));
    }

    #[rstest]
    #[case::too_short("sha256:abc")]
    #[case::non_hex(format!("sha256:{}g", "a".repeat(63)))]
    #[case::sha512_length(format!("sha512:{HELLO_SHA256}"))]
    fn rejects_malformed_digests(#[case] raw: String) {
        assert!(matches!(
            KnownHash::parse(&raw),
            Err(KnownHashError::InvalidDigest { .. })
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let hash = KnownHash::parse(HELLO_SHA256).expect("valid hash");
        assert_eq!(hash.to_string(), format!("sha256:{HELLO_SHA256}"));
    }

    #[test]
    fn matches_file_compares_contents() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("hello.txt");
        std::fs::write(&path, b"hello world").expect("write file");

        let good = KnownHash::parse(HELLO_SHA256).expect("valid hash");
        let bad = KnownHash::parse(&"0".repeat(64)).expect("valid hash");

        assert!(good.matches_file(&path).expect("readable"));
        assert!(!bad.matches_file(&path).expect("readable"));
    }
}
