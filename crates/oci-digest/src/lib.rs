//! Content digests for OCI content.
//!
//! A digest pairs a hash algorithm with the encoded hash of some content,
//! `algorithm:encoded`, and serves as that content's address.
//!
//! # Key Types
//!
//! - [`Algorithm`]: SHA-256 (canonical), SHA-384 and SHA-512, hex encoded
//! - [`AlgorithmRegistry`]: the algorithms a digest may name, with their
//!   encoded lengths and formats
//! - [`Digest`]: an immutable, grammar-checked digest string
//! - [`Digester`]: a running hash that can report its digest at any point
//! - [`Verifier`]: checks written bytes against an expected digest
//!
//! Parsing distinguishes a string that does not parse
//! ([`DigestError::InvalidFormat`], [`DigestError::InvalidLength`]) from one
//! that parses but names an algorithm the registry lacks
//! ([`DigestError::UnsupportedAlgorithm`]).

pub mod algorithm;
pub mod digest;
pub mod digester;
pub mod error;
pub mod registry;
pub mod verifier;

pub use algorithm::Algorithm;
pub use digest::{Digest, DIGEST_PATTERN};
pub use digester::Digester;
pub use error::{DigestError, DigestResult};
pub use registry::{AlgorithmEntry, AlgorithmRegistry, RegistryConfig};
pub use verifier::Verifier;

/// Digest `data` with the canonical algorithm.
pub fn from_bytes(data: &[u8]) -> Digest {
    Algorithm::CANONICAL.from_bytes(data)
}

/// Digest the UTF-8 bytes of `content` with the canonical algorithm.
pub fn from_str_content(content: &str) -> Digest {
    Algorithm::CANONICAL.from_str_content(content)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn canonical_helpers_use_sha256() {
        let d = from_bytes(b"abc");
        assert_eq!(d.algorithm(), Some(Algorithm::Sha256));
        assert_eq!(d, from_str_content("abc"));
    }

    proptest! {
        #[test]
        fn parse_roundtrips_from_bytes(data in proptest::collection::vec(any::<u8>(), 0..1024), idx in 0usize..3) {
            let alg = Algorithm::ALL[idx];
            let d = alg.from_bytes(&data);
            let parsed = Digest::parse(d.as_str()).unwrap();
            let mut digester = alg.digester();
            digester.update(&data);
            let expected = digester.digest();
            prop_assert_eq!(parsed.algorithm(), Some(alg));
            prop_assert_eq!(parsed.encoded(), expected.encoded());
            prop_assert_eq!(parsed, d);
        }
    }
}
