/// Errors produced while parsing, validating, or computing digests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// The digest string was empty.
    #[error("empty digest")]
    EmptyDigest,

    /// The digest string does not match the `algorithm:encoded` grammar, or the
    /// encoded portion is not valid for its algorithm.
    #[error("invalid checksum digest format")]
    InvalidFormat,

    /// The encoded portion has the wrong length for its algorithm.
    #[error("invalid checksum digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The digest is well formed but names an algorithm that is not registered.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Reading content to digest failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl DigestError {
    /// Returns `true` for errors where the digest parsed but cannot be used
    /// for verification.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedAlgorithm(_))
    }
}

impl From<std::io::Error> for DigestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result alias for digest operations.
pub type DigestResult<T> = Result<T, DigestError>;
