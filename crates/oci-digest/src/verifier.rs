use std::io;

use crate::digest::Digest;
use crate::digester::Digester;
use crate::registry::AlgorithmRegistry;

/// Checks a stream of written bytes against an expected digest.
///
/// Write the content under test, then call [`verified`](Self::verified).
/// The verifier owns its hash state; feeding it from more than one producer
/// interleaves the bytes and yields a meaningless result.
///
/// A target whose algorithm cannot be used for verification never verifies.
#[derive(Debug)]
pub struct Verifier {
    target: Digest,
    digester: Option<Digester>,
    current: Option<Digest>,
}

impl Verifier {
    /// Verify against `target` using the standard registry.
    pub fn new(target: Digest) -> Self {
        Self::with_registry(target, AlgorithmRegistry::standard())
    }

    /// Verify against `target`, resolving its algorithm through `registry`.
    pub fn with_registry(target: Digest, registry: &AlgorithmRegistry) -> Self {
        let digester = match registry.lookup(target.primary_token()) {
            Some(entry) => Some(entry.algorithm().digester()),
            None => {
                tracing::warn!(digest = %target, "cannot verify digest with unsupported algorithm");
                None
            }
        };
        let current = digester.as_ref().map(Digester::digest);
        Self {
            target,
            digester,
            current,
        }
    }

    pub fn target(&self) -> &Digest {
        &self.target
    }

    /// Digest of everything written so far, if the target is verifiable.
    pub fn current(&self) -> Option<&Digest> {
        self.current.as_ref()
    }

    /// Feed a chunk of content.
    pub fn write(&mut self, chunk: &[u8]) {
        let Some(digester) = self.digester.as_mut() else {
            return;
        };
        digester.update(chunk);
        let candidate = digester.digest();
        self.current = match Digest::parse_lenient(candidate.as_str()) {
            Ok(_) => Some(candidate),
            Err(err) => {
                tracing::warn!(error = %err, "running digest failed grammar check");
                None
            }
        };
    }

    /// Returns `true` if the content written so far matches the target.
    pub fn verified(&self) -> bool {
        self.current.as_ref() == Some(&self.target)
    }
}

impl io::Write for Verifier {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Verifier::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::algorithm::Algorithm;
    use crate::registry::RegistryConfig;

    #[test]
    fn verifies_matching_content() {
        let content = b"hello verifier";
        let mut v = Algorithm::Sha256.from_bytes(content).verifier();
        v.write(content);
        assert!(v.verified());
    }

    #[test]
    fn rejects_different_content() {
        let mut v = Algorithm::Sha256.from_bytes(b"expected").verifier();
        v.write(b"tampered");
        assert!(!v.verified());
    }

    #[test]
    fn empty_content_verifies_without_writes() {
        let v = Algorithm::Sha512.from_bytes(b"").verifier();
        assert!(v.verified());
    }

    #[test]
    fn unsupported_algorithm_never_verifies() {
        let target = Digest::parse_lenient("bean:0123456789abcdef").unwrap();
        let mut v = target.verifier();
        v.write(b"anything");
        assert!(!v.verified());
        assert!(v.current().is_none());
    }

    #[test]
    fn malformed_encoded_never_verifies() {
        let target = Digest::parse_lenient("sha256-garbage:pure").unwrap();
        let v = target.verifier();
        assert!(!v.verified());
    }

    #[test]
    fn registry_without_algorithm_cannot_verify() {
        let config = RegistryConfig {
            algorithms: vec![Algorithm::Sha256],
            canonical: Algorithm::Sha256,
        };
        let registry = AlgorithmRegistry::from_config(&config).unwrap();
        let target = Algorithm::Sha384.from_bytes(b"data");
        let mut v = Verifier::with_registry(target, &registry);
        v.write(b"data");
        assert!(!v.verified());
    }

    #[test]
    fn io_copy_into_verifier() {
        let data = vec![3u8; 70_000];
        let mut v = Algorithm::Sha384.from_bytes(&data).verifier();
        std::io::copy(&mut data.as_slice(), &mut v).unwrap();
        assert!(v.verified());
        assert_eq!(v.target(), v.current().unwrap());
    }

    proptest! {
        #[test]
        fn any_chunking_verifies(data in proptest::collection::vec(any::<u8>(), 0..2048), split in any::<prop::sample::Index>()) {
            let target = Algorithm::Sha256.from_bytes(&data);
            let at = split.index(data.len() + 1);
            let mut v = target.verifier();
            v.write(&data[..at]);
            v.write(&data[at..]);
            prop_assert!(v.verified());
        }

        #[test]
        fn different_content_fails(a in proptest::collection::vec(any::<u8>(), 0..512), b in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assume!(a != b);
            let mut v = Algorithm::Sha256.from_bytes(&a).verifier();
            v.write(&b);
            prop_assert!(!v.verified());
        }
    }
}
