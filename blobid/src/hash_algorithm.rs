//! A hash algorithm which can be used to make a `GitOid`.

use core::fmt::{Display, Formatter, Result as FmtResult};
use digest::DynDigest;
use sha1::Sha1;
use sha2::Sha256;

/// The hash algorithms usable for computing gitoids.
///
/// These are the two algorithms git itself supports for object IDs.
#[derive(Clone, Copy, PartialOrd, Eq, Ord, Debug, Hash, PartialEq)]
pub enum HashAlgorithm {
    /// [SHA-1](https://en.wikipedia.org/wiki/SHA-1)
    Sha1,
    /// [SHA-256](https://en.wikipedia.org/wiki/SHA-2)
    Sha256,
}

/// The number of bytes required to store the largest hash. Currently 32
/// for SHA-256. If another `HashAlgorithm` is added, update to reflect.
pub(crate) const NUM_HASH_BYTES: usize = 32;

impl HashAlgorithm {
    /// Generate a digester instance for the algorithm.
    pub(crate) fn create_digester(&self) -> Box<dyn DynDigest> {
        match self {
            HashAlgorithm::Sha1 => Box::<Sha1>::default(),
            HashAlgorithm::Sha256 => Box::<Sha256>::default(),
        }
    }
}

// Prints the name used on the wire: in manifest headers and in the
// object-store directory layout.
impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            HashAlgorithm::Sha1 => write!(f, "sha1"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}
