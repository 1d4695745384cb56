use std::fmt;
use std::io;

use sha2::{Digest as _, Sha256, Sha384, Sha512};

use crate::algorithm::Algorithm;
use crate::digest::Digest;

/// Live hash state for one of the supported algorithms.
#[derive(Clone)]
enum HashState {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl HashState {
    fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Sha256 => Self::Sha256(Sha256::new()),
            Algorithm::Sha384 => Self::Sha384(Sha384::new()),
            Algorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha384(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

/// Calculates the digest of written data.
///
/// Bytes go in through [`update`](Self::update) (or [`io::Write`]);
/// [`digest`](Self::digest) reports the digest of everything written so far
/// without disturbing the running state.
#[derive(Clone)]
pub struct Digester {
    algorithm: Algorithm,
    state: HashState,
    written: u64,
}

impl Digester {
    /// Create an empty accumulator for `algorithm`.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            state: HashState::new(algorithm),
            written: 0,
        }
    }

    /// The algorithm this digester computes.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Total number of bytes fed so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Feed bytes into the hash.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
        self.written += data.len() as u64;
    }

    /// The digest of all bytes written so far.
    pub fn digest(&self) -> Digest {
        self.clone().finalize()
    }

    /// Consume the digester and return its digest.
    pub fn finalize(self) -> Digest {
        let raw = self.state.finalize();
        Digest::from_hash(self.algorithm, &raw)
    }
}

impl fmt::Debug for Digester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digester")
            .field("algorithm", &self.algorithm)
            .field("written", &self.written)
            .finish()
    }
}

impl io::Write for Digester {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
