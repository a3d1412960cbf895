//! The types of objects for which a `GitOid` can be made.

use core::fmt::{Display, Formatter, Result as FmtResult};

/// The four object kinds git defines.
///
/// Artifact identification only ever uses [`ObjectType::Blob`]; the
/// others are provided for completeness of the gitoid scheme.
#[derive(Clone, Copy, PartialOrd, Eq, Ord, Debug, Hash, PartialEq)]
pub enum ObjectType {
    /// An opaque sequence of bytes; file contents.
    Blob,
    /// A directory listing.
    Tree,
    /// A commit object.
    Commit,
    /// An annotated tag.
    Tag,
}

// Prints the name used in the gitoid header framing.
impl Display for ObjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ObjectType::Blob => write!(f, "blob"),
            ObjectType::Tree => write!(f, "tree"),
            ObjectType::Commit => write!(f, "commit"),
            ObjectType::Tag => write!(f, "tag"),
        }
    }
}
