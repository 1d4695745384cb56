use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::error::{DigestError, DigestResult};
use crate::registry::AlgorithmRegistry;
use crate::verifier::Verifier;

/// Unanchored digest grammar, suitable for embedding in larger patterns.
pub const DIGEST_PATTERN: &str = r"[a-z0-9]+(?:[+._-][a-z0-9]+)*:[a-zA-Z0-9=_-]+";

static DIGEST_ANCHORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{DIGEST_PATTERN}$")).expect("digest grammar regex is valid")
});

fn is_component_separator(c: char) -> bool {
    matches!(c, '+' | '.' | '_' | '-')
}

/// A validated `algorithm:encoded` content digest.
///
/// For example
/// `sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc`.
///
/// A `Digest` never changes after construction. Every constructor runs the
/// same grammar check; [`Digest::parse`] additionally validates the encoded
/// portion against the algorithm registry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    value: String,
    sep: usize,
}

impl Digest {
    /// Parse and fully validate against the standard registry.
    pub fn parse(s: &str) -> DigestResult<Self> {
        AlgorithmRegistry::standard().parse(s)
    }

    /// Check only the digest grammar.
    ///
    /// The result may name an algorithm no registry knows; call
    /// [`validate_with`](Self::validate_with) before relying on it.
    pub fn parse_lenient(s: &str) -> DigestResult<Self> {
        if s.is_empty() {
            return Err(DigestError::EmptyDigest);
        }
        if !DIGEST_ANCHORED.is_match(s) {
            return Err(DigestError::InvalidFormat);
        }
        let sep = s.find(':').ok_or(DigestError::InvalidFormat)?;
        Ok(Self {
            value: s.to_string(),
            sep,
        })
    }

    /// Join an algorithm token and an encoded hash, checking the grammar only.
    pub fn from_encoded(algorithm: &str, encoded: &str) -> DigestResult<Self> {
        Self::parse_lenient(&format!("{algorithm}:{encoded}"))
    }

    /// Build a digest from raw hash output.
    pub(crate) fn from_hash(algorithm: Algorithm, raw: &[u8]) -> Self {
        let value = format!("{}:{}", algorithm.as_str(), algorithm.encode(raw));
        debug_assert!(DIGEST_ANCHORED.is_match(&value));
        Self {
            sep: algorithm.as_str().len(),
            value,
        }
    }

    /// Validate against the standard registry.
    pub fn validate(&self) -> DigestResult<()> {
        self.validate_with(AlgorithmRegistry::standard())
    }

    /// Validate the primary algorithm and encoded portion against `registry`.
    pub fn validate_with(&self, registry: &AlgorithmRegistry) -> DigestResult<()> {
        let primary = self.primary_token();
        if !registry.is_available(primary) {
            tracing::debug!(digest = %self, algorithm = primary, "digest algorithm not registered");
            return Err(DigestError::UnsupportedAlgorithm(primary.to_string()));
        }
        registry.validate_encoded(primary, self.encoded())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The full algorithm component, including extra `+._-` parts
    /// (`sha256+b64` for `sha256+b64:...`).
    pub fn algorithm_token(&self) -> &str {
        &self.value[..self.sep]
    }

    /// The algorithm component up to the first extra-part separator.
    pub fn primary_token(&self) -> &str {
        let token = self.algorithm_token();
        token
            .find(is_component_separator)
            .map_or(token, |idx| &token[..idx])
    }

    /// The algorithm named by the primary token, if this crate implements it.
    pub fn algorithm(&self) -> Option<Algorithm> {
        self.primary_token().parse().ok()
    }

    /// The encoded portion after the first `:`.
    pub fn encoded(&self) -> &str {
        &self.value[self.sep + 1..]
    }

    /// A verifier that checks written content against this digest.
    pub fn verifier(&self) -> Verifier {
        Verifier::new(self.clone())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.value)
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.value
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl PartialEq<str> for Digest {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for Digest {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256_HEX: &str = "e58fcf7418d4390dec8e8fb69d88c06ec07039d651fedd3aa72af9972e7d046b";
    const SHA384_HEX: &str = "d3fc7881460b7e22e3d172954463dddd7866d17597e7248453c48b3e9d26d9596bf9c4a9cf8072c9d5bad76e19af801d";

    #[test]
    fn parses_sha256() {
        let d = Digest::parse(&format!("sha256:{SHA256_HEX}")).unwrap();
        assert_eq!(d.algorithm(), Some(Algorithm::Sha256));
        assert_eq!(d.algorithm_token(), "sha256");
        assert_eq!(d.encoded(), SHA256_HEX);
    }

    #[test]
    fn parses_sha384() {
        let d = Digest::parse(&format!("sha384:{SHA384_HEX}")).unwrap();
        assert_eq!(d.algorithm(), Some(Algorithm::Sha384));
        assert_eq!(d.encoded(), SHA384_HEX);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Digest::parse(""), Err(DigestError::EmptyDigest));
    }

    #[test]
    fn grammar_failures_are_invalid_format() {
        for input in [
            "sha256:",
            ":",
            "d41d8cd98f00b204e9800998ecf8427e",
            "SHA256:5b0bcabd1ed22e9fb1310cf6c2dec7cdef19f0ad69efa1f392e94a4333501270",
            ":5b0bcabd1ed22e9fb1310cf6c2dec7cdef19f0ad69efa1f392e94a4333501270",
            "sha256",
        ] {
            assert_eq!(Digest::parse(input), Err(DigestError::InvalidFormat), "{input}");
        }
        let repeated = format!("sha384__foo+bar:{SHA384_HEX}");
        assert_eq!(Digest::parse(&repeated), Err(DigestError::InvalidFormat));
        let mixed = "sha256+foo+-b:c86f7763873b6c0aae22d963bab59b4f5debbed6685761b5951584f6efb0633b";
        assert_eq!(Digest::parse(mixed), Err(DigestError::InvalidFormat));
    }

    #[test]
    fn uppercase_hex_is_invalid_format() {
        let input = format!("sha256:{}", SHA256_HEX.to_uppercase());
        assert_eq!(Digest::parse(&input), Err(DigestError::InvalidFormat));
    }

    #[test]
    fn wrong_lengths() {
        assert_eq!(
            Digest::parse("sha256:abcdef0123456789"),
            Err(DigestError::InvalidLength { expected: 64, actual: 16 })
        );
        assert!(matches!(
            Digest::parse("sha256:d41d8cd98f00b204e9800m98ecf8427e"),
            Err(DigestError::InvalidLength { .. })
        ));
        assert!(matches!(
            Digest::parse(&format!("sha512:{SHA256_HEX}")),
            Err(DigestError::InvalidLength { expected: 128, actual: 64 })
        ));
        assert!(matches!(
            Digest::parse("sha256+b64:LCa0a2j_xo_5m0U8HTBBNBNCLXBkg7-g-YpeiGJm564"),
            Err(DigestError::InvalidLength { .. })
        ));
    }

    #[test]
    fn unknown_algorithm_is_unsupported() {
        let err = Digest::parse("foo:d41d8cd98f00b204e9800998ecf8427e").unwrap_err();
        assert_eq!(err, DigestError::UnsupportedAlgorithm("foo".into()));
        assert!(err.is_unsupported());
    }

    #[test]
    fn lenient_parse_keeps_unregistered_algorithm() {
        let d = Digest::parse_lenient("multihash+base58:QmRZxt2b1FVZPNqd8hsiykDL3TdBDeTSPX9Kv46HmX4Gx8")
            .unwrap();
        assert_eq!(d.algorithm_token(), "multihash+base58");
        assert_eq!(d.primary_token(), "multihash");
        assert_eq!(d.algorithm(), None);
        assert!(d.validate().unwrap_err().is_unsupported());
    }

    #[test]
    fn extra_components_resolve_primary_algorithm() {
        let hex = "c86f7763873b6c0aae22d963bab59b4f5debbed6685761b5951584f6efb0633b";
        for token in ["sha256+b64", "sha256+foo-bar", "sha256.foo-bar"] {
            let d = Digest::parse(&format!("{token}:{hex}")).unwrap();
            assert_eq!(d.algorithm_token(), token);
            assert_eq!(d.primary_token(), "sha256");
            assert_eq!(d.algorithm(), Some(Algorithm::Sha256));
        }
        let d = Digest::parse(&format!("sha384.foo+bar:{SHA384_HEX}")).unwrap();
        assert_eq!(d.algorithm(), Some(Algorithm::Sha384));
    }

    #[test]
    fn from_encoded_matches_parse() {
        let parsed = Digest::parse(&format!("sha384_foo+bar:{SHA384_HEX}")).unwrap();
        let joined = Digest::from_encoded("sha384_foo+bar", SHA384_HEX).unwrap();
        assert_eq!(parsed, joined);
    }

    #[test]
    fn equality_with_strings() {
        let input = format!("sha256:{SHA256_HEX}");
        let d: Digest = input.parse().unwrap();
        assert_eq!(d, input.as_str());
        assert_eq!(d.to_string(), input);
    }

    #[test]
    fn serde_roundtrip_and_rejection() {
        let d = Algorithm::Sha256.from_bytes(b"serde");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{d}\""));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<Digest>("\"sha256:abc\"").is_err());
    }
}
