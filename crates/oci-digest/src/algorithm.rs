use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::digester::Digester;
use crate::error::{DigestError, DigestResult};

/// Read buffer size used by [`Algorithm::from_reader`].
const READ_CHUNK: usize = 32 * 1024;

/// A hash algorithm together with its string encoding.
///
/// All supported algorithms are members of the SHA-2 family and encode their
/// output as lowercase hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// SHA-256, hex encoded (lowercase only).
    Sha256,
    /// SHA-384, hex encoded (lowercase only).
    Sha384,
    /// SHA-512, hex encoded (lowercase only).
    Sha512,
}

impl Algorithm {
    /// The primary algorithm for content produced by this library.
    pub const CANONICAL: Self = Self::Sha256;

    /// Every algorithm this crate can compute.
    pub const ALL: [Self; 3] = [Self::Sha256, Self::Sha384, Self::Sha512];

    /// The identifier used as the algorithm component of a digest string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Number of bytes in the raw hash output.
    pub const fn size(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Length of the hex-encoded hash output.
    pub const fn encoded_len(&self) -> usize {
        self.size() * 2
    }

    /// Encode raw hash bytes into the encoded portion of a digest.
    pub fn encode(&self, raw: &[u8]) -> String {
        hex::encode(raw)
    }

    /// A fresh accumulator for this algorithm.
    pub fn digester(&self) -> Digester {
        Digester::new(*self)
    }

    /// Digest a byte slice.
    pub fn from_bytes(&self, data: &[u8]) -> Digest {
        let mut digester = self.digester();
        digester.update(data);
        digester.finalize()
    }

    /// Digest the UTF-8 bytes of a string.
    pub fn from_str_content(&self, content: &str) -> Digest {
        self.from_bytes(content.as_bytes())
    }

    /// Digest everything readable from `reader`.
    pub fn from_reader<R: Read>(&self, mut reader: R) -> DigestResult<Digest> {
        let mut digester = self.digester();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            digester.update(&buf[..n]);
        }
        Ok(digester.finalize())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| DigestError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::CANONICAL
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn identifiers_roundtrip() {
        for alg in Algorithm::ALL {
            assert_eq!(alg.as_str().parse::<Algorithm>().unwrap(), alg);
        }
    }

    #[test]
    fn unknown_identifier_is_unsupported() {
        let err = "md5".parse::<Algorithm>().unwrap_err();
        assert_eq!(err, DigestError::UnsupportedAlgorithm("md5".into()));
    }

    #[test]
    fn sizes_match_sha2_outputs() {
        assert_eq!(Algorithm::Sha256.size(), 32);
        assert_eq!(Algorithm::Sha384.encoded_len(), 96);
        assert_eq!(Algorithm::Sha512.encoded_len(), 128);
    }

    #[test]
    fn canonical_is_sha256() {
        assert_eq!(Algorithm::CANONICAL, Algorithm::Sha256);
        assert_eq!(Algorithm::default(), Algorithm::Sha256);
    }

    #[test]
    fn known_sha256_of_empty_input() {
        let d = Algorithm::Sha256.from_bytes(b"");
        assert_eq!(
            d.as_str(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn bytes_reader_and_string_agree() {
        let text = "the quick brown fox";
        for alg in Algorithm::ALL {
            let from_bytes = alg.from_bytes(text.as_bytes());
            let from_reader = alg.from_reader(Cursor::new(text.as_bytes())).unwrap();
            let from_str = alg.from_str_content(text);
            assert_eq!(from_bytes, from_reader);
            assert_eq!(from_bytes, from_str);
            assert_eq!(from_bytes.encoded().len(), alg.encoded_len());
        }
    }

    #[test]
    fn reader_spanning_multiple_chunks() {
        let data = vec![7u8; READ_CHUNK * 2 + 13];
        let from_reader = Algorithm::Sha512
            .from_reader(Cursor::new(data.as_slice()))
            .unwrap();
        assert_eq!(from_reader, Algorithm::Sha512.from_bytes(&data));
    }

    #[test]
    fn serde_uses_identifier() {
        let json = serde_json::to_string(&Algorithm::Sha384).unwrap();
        assert_eq!(json, "\"sha384\"");
        let parsed: Algorithm = serde_json::from_str("\"sha512\"").unwrap();
        assert_eq!(parsed, Algorithm::Sha512);
    }
}
