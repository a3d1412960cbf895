//! [`Manifest`] type that records the inputs used to build an artifact.

use {
    blobid::{GitOid, HashAlgorithm, ObjectType},
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        io::Write as _,
    },
};

/// An OmniBOR input manifest: the identified inputs of one build.
///
/// A manifest lists one line per input, each carrying the input's blob
/// gitoid and, when the input was itself built with OmniBOR enabled,
/// the identifier of the input's own manifest as a `bom` reference.
/// Those references are what chain manifests together into an Artifact
/// Dependency Graph.
///
/// The manifest is content-addressed by its own gitoid, computed over
/// exactly the bytes [`Manifest::as_bytes`] returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    /// The hash algorithm every identifier in the manifest uses.
    algorithm: HashAlgorithm,

    /// The input entries, sorted ascending by gitoid hex.
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Construct a manifest, sorting the entries into canonical order.
    pub(crate) fn new(algorithm: HashAlgorithm, mut entries: Vec<ManifestEntry>) -> Self {
        // Fixed-width lowercase hex orders the same as the raw digest
        // bytes, so the sort can compare the bytes directly.
        entries.sort_by(|a, b| {
            a.artifact
                .hash()
                .as_bytes()
                .cmp(b.artifact.hash().as_bytes())
        });

        Manifest { algorithm, entries }
    }

    /// The header line at the top of the manifest.
    pub fn header(&self) -> String {
        format!("gitoid:{}:{}\n", ObjectType::Blob, self.algorithm)
    }

    /// The hash algorithm the manifest's identifiers use.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The entries, in the order they are serialized.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries[..]
    }

    /// Serialize the manifest.
    ///
    /// These are the bytes stored in the object store, and the bytes
    /// over which the manifest's own gitoid is computed.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        let _ = write!(bytes, "{}", self.header());

        for entry in &self.entries {
            let _ = write!(bytes, "blob {}", entry.artifact.hash());

            if let Some(bom) = &entry.bom {
                let _ = write!(bytes, " bom {}", bom);
            }

            let _ = writeln!(bytes);
        }

        bytes
    }
}

/// A single input line in a [`Manifest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The gitoid of the input itself.
    artifact: GitOid,

    /// The identifier of the input's own manifest, if it reported one.
    ///
    /// Stored as the verbatim hex the input's note section carried.
    bom: Option<Box<str>>,
}

impl ManifestEntry {
    pub(crate) fn new(artifact: GitOid, bom: Option<Box<str>>) -> ManifestEntry {
        ManifestEntry { artifact, bom }
    }

    /// Get the gitoid of the input.
    pub fn artifact(&self) -> GitOid {
        self.artifact
    }

    /// Get the `bom` reference, if present.
    pub fn bom(&self) -> Option<&str> {
        self.bom.as_deref()
    }
}

impl Display for ManifestEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "blob {}", self.artifact.hash())?;

        if let Some(bom) = &self.bom {
            write!(f, " bom {}", bom)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(content: &[u8], algorithm: HashAlgorithm) -> GitOid {
        GitOid::new_from_bytes(algorithm, ObjectType::Blob, content)
    }

    #[test]
    fn empty_manifest_is_just_the_header() {
        let manifest = Manifest::new(HashAlgorithm::Sha1, Vec::new());
        assert_eq!(manifest.as_bytes(), b"gitoid:blob:sha1\n");

        let manifest = Manifest::new(HashAlgorithm::Sha256, Vec::new());
        assert_eq!(manifest.as_bytes(), b"gitoid:blob:sha256\n");
    }

    #[test]
    fn entries_serialize_sorted_by_hex() {
        let a = oid(b"hello world", HashAlgorithm::Sha1);
        let b = oid(b"", HashAlgorithm::Sha1);

        // Passed in reverse of hex order; `95d0…` must still come first.
        let manifest = Manifest::new(
            HashAlgorithm::Sha1,
            vec![
                ManifestEntry::new(b, None),
                ManifestEntry::new(a, None),
            ],
        );

        let expected = "gitoid:blob:sha1\n\
                        blob 95d09f2b10159347eece71399a7e2e907ea3df4f\n\
                        blob e69de29bb2d1d6434b8b29ae775ad8c2e48c5391\n";

        assert_eq!(manifest.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn bom_column_is_appended_verbatim() {
        let artifact = oid(b"hello world", HashAlgorithm::Sha1);
        let bom: Box<str> = "aa".repeat(20).into();

        let manifest = Manifest::new(
            HashAlgorithm::Sha1,
            vec![ManifestEntry::new(artifact, Some(bom))],
        );

        let expected = format!(
            "gitoid:blob:sha1\nblob 95d09f2b10159347eece71399a7e2e907ea3df4f bom {}\n",
            "aa".repeat(20)
        );

        assert_eq!(manifest.as_bytes(), expected.as_bytes());
    }
}
