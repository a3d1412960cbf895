//! The [`OmniborError`] type for manifest-store failures.

use {
    std::error::Error,
    std::fmt::{Display, Formatter, Result as FmtResult},
    std::io::Error as IoError,
};

#[cfg(doc)]
use crate::{storage::FileSystemStore, tracker::DependencyTracker};

/// An error arising while writing an OmniBOR manifest.
///
/// All variants describe object-store failures; per-dependency read
/// failures never surface here because the builder skips those inputs.
/// An error from [`DependencyTracker::write_omnibor`] means no manifest
/// identifier exists for the output, but the tracker's registry and
/// note store are untouched and a later attempt may succeed.
#[derive(Debug)]
#[non_exhaustive]
pub enum OmniborError {
    /// Can't access the object-store root.
    CantAccessRoot(Box<str>, Box<IoError>),

    /// Object-store root exists but is not a directory.
    ObjectStoreNotDir(Box<str>),

    /// Can't create the object-store root.
    CantCreateObjectStoreDir(Box<str>, Box<IoError>),

    /// Produced an invalid path into the object store.
    InvalidObjectStorePath(Box<str>),

    /// Can't create the directories holding a manifest.
    CantWriteManifestDir(Box<str>, Box<IoError>),

    /// Can't write the manifest file itself.
    CantWriteManifest(Box<str>, Box<IoError>),
}

impl Display for OmniborError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OmniborError::CantAccessRoot(s, ..) => {
                write!(f, "unable to access object store root '{}'", s)
            }
            OmniborError::ObjectStoreNotDir(s) => {
                write!(f, "object store root is not a directory; '{}'", s)
            }
            OmniborError::CantCreateObjectStoreDir(s, ..) => {
                write!(f, "can't create object store root '{}'", s)
            }
            OmniborError::InvalidObjectStorePath(s) => {
                write!(f, "not a valid object store path; '{}'", s)
            }
            OmniborError::CantWriteManifestDir(s, _) => {
                write!(f, "can't create manifest directory '{}'", s)
            }
            OmniborError::CantWriteManifest(s, _) => {
                write!(f, "can't write manifest file '{}'", s)
            }
        }
    }
}

impl Error for OmniborError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OmniborError::ObjectStoreNotDir(_) | OmniborError::InvalidObjectStorePath(_) => None,
            OmniborError::CantAccessRoot(_, source)
            | OmniborError::CantCreateObjectStoreDir(_, source)
            | OmniborError::CantWriteManifestDir(_, source)
            | OmniborError::CantWriteManifest(_, source) => Some(source),
        }
    }
}
