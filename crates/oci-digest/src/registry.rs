use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::digest::Digest;
use crate::error::{DigestError, DigestResult};

// Anchored encoded-portion patterns. Uppercase hex is rejected.
static SHA256_ENCODED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{64}$").expect("sha256 encoded regex is valid"));
static SHA384_ENCODED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{96}$").expect("sha384 encoded regex is valid"));
static SHA512_ENCODED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{128}$").expect("sha512 encoded regex is valid"));

static STANDARD: LazyLock<AlgorithmRegistry> = LazyLock::new(AlgorithmRegistry::default);

/// One registered algorithm: identifier, raw output length, and the anchored
/// pattern its encoded form must match.
#[derive(Clone, Debug)]
pub struct AlgorithmEntry {
    algorithm: Algorithm,
    encoded_pattern: &'static Regex,
}

impl AlgorithmEntry {
    fn new(algorithm: Algorithm) -> Self {
        let encoded_pattern: &'static Regex = match algorithm {
            Algorithm::Sha256 => &*SHA256_ENCODED,
            Algorithm::Sha384 => &*SHA384_ENCODED,
            Algorithm::Sha512 => &*SHA512_ENCODED,
        };
        Self {
            algorithm,
            encoded_pattern,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn identifier(&self) -> &'static str {
        self.algorithm.as_str()
    }

    /// Byte length of the raw hash.
    pub fn digest_len(&self) -> usize {
        self.algorithm.size()
    }

    pub fn encoded_pattern(&self) -> &Regex {
        self.encoded_pattern
    }
}

/// Which algorithms a registry accepts and which one it produces by default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Algorithms available for parsing and verification.
    pub algorithms: Vec<Algorithm>,
    /// Algorithm used when calling code does not name one.
    pub canonical: Algorithm,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            algorithms: Algorithm::ALL.to_vec(),
            canonical: Algorithm::CANONICAL,
        }
    }
}

/// The table of algorithms a digest may name.
///
/// A registry is built once and passed by reference wherever digests are
/// parsed or validated. [`AlgorithmRegistry::standard`] is the shared
/// immutable default holding SHA-256, SHA-384 and SHA-512.
#[derive(Clone, Debug)]
pub struct AlgorithmRegistry {
    entries: BTreeMap<&'static str, AlgorithmEntry>,
    canonical: Algorithm,
}

impl AlgorithmRegistry {
    /// Build a registry from configuration.
    ///
    /// Fails with [`DigestError::UnsupportedAlgorithm`] if the canonical
    /// algorithm is not among the configured ones.
    pub fn from_config(config: &RegistryConfig) -> DigestResult<Self> {
        let mut registry = Self {
            entries: BTreeMap::new(),
            canonical: config.canonical,
        };
        for alg in &config.algorithms {
            registry.register(*alg);
        }
        if !registry.entries.contains_key(config.canonical.as_str()) {
            return Err(DigestError::UnsupportedAlgorithm(
                config.canonical.as_str().to_string(),
            ));
        }
        Ok(registry)
    }

    /// The shared default registry.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Add an algorithm. Returns `false` if it was already registered.
    pub fn register(&mut self, algorithm: Algorithm) -> bool {
        if self.entries.contains_key(algorithm.as_str()) {
            return false;
        }
        self.entries
            .insert(algorithm.as_str(), AlgorithmEntry::new(algorithm));
        true
    }

    pub fn canonical(&self) -> Algorithm {
        self.canonical
    }

    /// Registered algorithms in identifier order.
    pub fn algorithms(&self) -> impl Iterator<Item = Algorithm> + '_ {
        self.entries.values().map(|e| e.algorithm)
    }

    /// Look up a bare algorithm name or the algorithm part of a full digest.
    pub fn lookup(&self, token: &str) -> Option<&AlgorithmEntry> {
        let name = token.split_once(':').map_or(token, |(alg, _)| alg);
        self.entries.get(name)
    }

    pub fn is_available(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    /// Byte length of the algorithm's raw digest, 0 if unavailable.
    pub fn hash_length(&self, token: &str) -> usize {
        self.lookup(token).map_or(0, AlgorithmEntry::digest_len)
    }

    /// Encode raw hash bytes for the named algorithm.
    pub fn encode(&self, token: &str, raw: &[u8]) -> DigestResult<String> {
        let entry = self
            .lookup(token)
            .ok_or_else(|| DigestError::UnsupportedAlgorithm(token.to_string()))?;
        Ok(entry.algorithm.encode(raw))
    }

    /// Check the encoded portion of a digest against the named algorithm.
    pub fn validate_encoded(&self, token: &str, encoded: &str) -> DigestResult<()> {
        let entry = self
            .lookup(token)
            .ok_or_else(|| DigestError::UnsupportedAlgorithm(token.to_string()))?;
        let expected = entry.digest_len() * 2;
        if encoded.len() != expected {
            return Err(DigestError::InvalidLength {
                expected,
                actual: encoded.len(),
            });
        }
        if !entry.encoded_pattern.is_match(encoded) {
            return Err(DigestError::InvalidFormat);
        }
        Ok(())
    }

    /// Parse and fully validate a digest string against this registry.
    pub fn parse(&self, s: &str) -> DigestResult<Digest> {
        let digest = Digest::parse_lenient(s)?;
        digest.validate_with(self)?;
        Ok(digest)
    }

    /// Digest `data` with the canonical algorithm.
    pub fn digest_canonical(&self, data: &[u8]) -> Digest {
        self.canonical.from_bytes(data)
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        let mut registry = Self {
            entries: BTreeMap::new(),
            canonical: Algorithm::CANONICAL,
        };
        for alg in Algorithm::ALL {
            registry.register(alg);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_has_sha2_family() {
        let r = AlgorithmRegistry::standard();
        let algs: Vec<_> = r.algorithms().collect();
        assert_eq!(algs, vec![Algorithm::Sha256, Algorithm::Sha384, Algorithm::Sha512]);
        assert_eq!(r.canonical(), Algorithm::Sha256);
    }

    #[test]
    fn availability_accepts_full_digest() {
        let r = AlgorithmRegistry::standard();
        assert!(r.is_available("sha256"));
        assert!(r.is_available("sha512:abc"));
        assert!(!r.is_available("md5"));
        assert!(!r.is_available("sha256+b64"));
    }

    #[test]
    fn hash_length_zero_when_unavailable() {
        let r = AlgorithmRegistry::standard();
        assert_eq!(r.hash_length("sha384"), 48);
        assert_eq!(r.hash_length("blake3"), 0);
    }

    #[test]
    fn register_is_idempotent() {
        let mut r = AlgorithmRegistry::default();
        assert!(!r.register(Algorithm::Sha256));
    }

    #[test]
    fn config_restricts_algorithms() {
        let config = RegistryConfig {
            algorithms: vec![Algorithm::Sha256],
            canonical: Algorithm::Sha256,
        };
        let r = AlgorithmRegistry::from_config(&config).unwrap();
        assert!(!r.is_available("sha512"));
        let err = r.parse(&Algorithm::Sha512.from_bytes(b"x").to_string()).unwrap_err();
        assert_eq!(err, DigestError::UnsupportedAlgorithm("sha512".into()));
    }

    #[test]
    fn config_requires_registered_canonical() {
        let config = RegistryConfig {
            algorithms: vec![Algorithm::Sha512],
            canonical: Algorithm::Sha256,
        };
        assert!(AlgorithmRegistry::from_config(&config).is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: RegistryConfig = serde_json::from_str(r#"{"canonical":"sha512"}"#).unwrap();
        assert_eq!(config.algorithms.len(), 3);
        assert_eq!(config.canonical, Algorithm::Sha512);
        let r = AlgorithmRegistry::from_config(&config).unwrap();
        assert_eq!(r.digest_canonical(b"").algorithm(), Some(Algorithm::Sha512));
    }

    #[test]
    fn validate_encoded_checks_length_then_format() {
        let r = AlgorithmRegistry::standard();
        assert_eq!(
            r.validate_encoded("sha256", "abcdef0123456789"),
            Err(DigestError::InvalidLength { expected: 64, actual: 16 })
        );
        let upper = "E58FCF7418D4390DEC8E8FB69D88C06EC07039D651FEDD3AA72AF9972E7D046B";
        assert_eq!(r.validate_encoded("sha256", upper), Err(DigestError::InvalidFormat));
        assert_eq!(
            r.validate_encoded("foo", "d41d8cd98f00b204e9800998ecf8427e"),
            Err(DigestError::UnsupportedAlgorithm("foo".into()))
        );
    }

    #[test]
    fn encode_is_lowercase_hex() {
        let r = AlgorithmRegistry::standard();
        assert_eq!(r.encode("sha256", &[0xAB, 0x01]).unwrap(), "ab01");
        assert!(r.encode("crc32", &[1]).is_err());
    }
}
