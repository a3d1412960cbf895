//! Content-addressed storage of OmniBOR manifests.

use {
    crate::{error::OmniborError, pathbuf, util::clone_as_boxstr::CloneAsBoxstr},
    blobid::GitOid,
    std::{
        fs::{self, DirBuilder, OpenOptions},
        io::{self, Write as _},
        path::{Path, PathBuf},
    },
};

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt as _, OpenOptionsExt as _};

/// Directories and manifest files are private to the invoking user.
#[cfg(unix)]
const STORE_MODE: u32 = 0o700;

/// An on-disk object store addressed by manifest gitoid.
///
/// A manifest whose gitoid hex is `H` lives at
/// `<root>/objects/gitoid_blob_<algorithm>/<H[..2]>/<H[2..]>`, so the
/// store can hold SHA-1 and SHA-256 manifests side by side and any
/// consumer can find a manifest knowing only its identifier.
#[derive(Debug)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    /// Open a store at `root`, creating the root if it doesn't exist.
    ///
    /// Missing components of `root` are created with mode 0700. An
    /// existing root only has to be a directory; its mode is left alone.
    pub fn new(root: impl AsRef<Path>) -> Result<FileSystemStore, OmniborError> {
        let root = root.as_ref().to_owned();

        if root.exists() {
            let meta = fs::metadata(&root).map_err(|source| {
                OmniborError::CantAccessRoot(root.clone_as_boxstr(), Box::new(source))
            })?;

            if !meta.is_dir() {
                return Err(OmniborError::ObjectStoreNotDir(root.clone_as_boxstr()));
            }
        } else {
            make_dirs(&root).map_err(|source| {
                OmniborError::CantCreateObjectStoreDir(root.clone_as_boxstr(), Box::new(source))
            })?;
        }

        Ok(FileSystemStore { root })
    }

    /// The path at which a manifest with this gitoid is stored.
    pub fn object_path(&self, id: &GitOid) -> PathBuf {
        let kind = format!("gitoid_{}_{}", id.object_type(), id.hash_algorithm());
        let hex = id.as_hex();
        let (prefix, remainder) = hex.split_at(2);
        pathbuf![&self.root, "objects", &kind, prefix, remainder]
    }

    /// Write manifest bytes under their gitoid.
    ///
    /// Intermediate directories are created as needed (mode 0700,
    /// already-existing ones are fine); an existing object file is
    /// overwritten. On failure, directories created so far are left in
    /// place. Returns the path the manifest was written to.
    pub fn put(&self, id: &GitOid, bytes: &[u8]) -> Result<PathBuf, OmniborError> {
        let path = self.object_path(id);

        let parent_dirs = path
            .parent()
            .ok_or_else(|| OmniborError::InvalidObjectStorePath(path.clone_as_boxstr()))?;

        make_dirs(parent_dirs).map_err(|source| {
            OmniborError::CantWriteManifestDir(parent_dirs.clone_as_boxstr(), Box::new(source))
        })?;

        write_object(&path, bytes).map_err(|source| {
            OmniborError::CantWriteManifest(path.clone_as_boxstr(), Box::new(source))
        })?;

        Ok(path)
    }
}

/// Create a directory and any missing parents.
fn make_dirs(path: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    builder.mode(STORE_MODE);

    builder.create(path)
}

/// Create or truncate the object file and write its contents.
fn write_object(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    options.mode(STORE_MODE);

    let mut file = options.open(path)?;
    file.write_all(bytes)
}
