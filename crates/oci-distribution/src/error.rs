use oci_digest::DigestError;
use oci_struct::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("{0} does not appear to be an http address")]
    InvalidAddress(String),

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("invalid request path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid digest for request: {0}")]
    Digest(#[from] DigestError),

    #[error("malformed WWW-Authenticate header: {0}")]
    MalformedChallenge(String),

    #[error("invalid response document: {0}")]
    Document(#[from] ValidationError),
}

pub type DistributionResult<T> = Result<T, DistributionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_errors_convert() {
        let err: DistributionError = DigestError::InvalidFormat.into();
        assert!(matches!(err, DistributionError::Digest(DigestError::InvalidFormat)));
        assert_eq!(err.to_string(), "invalid digest for request: invalid checksum digest format");
    }
}
