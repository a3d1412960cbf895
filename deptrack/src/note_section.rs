//! Records of OmniBOR identifiers found in input files.
//!
//! An input that was itself assembled with OmniBOR enabled carries the
//! identifier of its own input manifest in a `.note.omnibor` ELF
//! section. The host's note reader extracts those identifiers and hands
//! them to the tracker, which folds them into the output's manifest as
//! `bom` references.

use blobid::HashAlgorithm;
use std::path::PathBuf;

/// The manifest identifiers one input file reported for itself.
///
/// The hex strings are stored exactly as the note reader supplied them;
/// the tracker never parses or validates note contents.
#[derive(Clone, Debug)]
pub(crate) struct NoteSection {
    /// The input file the note was read from.
    pub(crate) path: PathBuf,

    /// The SHA-1 manifest identifier, if the note carried one.
    pub(crate) sha1_hex: Option<Box<str>>,

    /// The SHA-256 manifest identifier, if the note carried one.
    pub(crate) sha256_hex: Option<Box<str>>,
}

impl NoteSection {
    /// Get the recorded identifier for one hash algorithm.
    pub(crate) fn id_hex(&self, algorithm: HashAlgorithm) -> Option<&str> {
        match algorithm {
            HashAlgorithm::Sha1 => self.sha1_hex.as_deref(),
            HashAlgorithm::Sha256 => self.sha256_hex.as_deref(),
        }
    }
}
