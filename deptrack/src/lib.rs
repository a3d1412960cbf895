//! Dependency tracking and artifact identity for assembler outputs.
//!
//! While assembling an output object, the host registers every input
//! file it opens with a [`DependencyTracker`]. At finalization the
//! tracker can then produce two artifacts describing the build:
//!
//! - __A `make` dependency rule__: a `target: dep1 dep2 …` line with
//!   GNU make's quoting and 72-column line continuation, written to a
//!   caller-chosen path.
//! - __An [OmniBOR][omnibor] input manifest__: one line per input,
//!   content-addressing it by its git blob identifier (gitoid), sorted
//!   by hash, stored in an on-disk content-addressed object store. The
//!   manifest's own gitoid is returned as the output's artifact
//!   identifier.
//!
//! Inputs that were themselves built with OmniBOR enabled carry their
//! manifest identifiers in a `.note.omnibor` ELF section; the host's
//! note reader feeds those to the tracker, and the builder folds them
//! into the manifest as `bom` references, extending the Artifact
//! Dependency Graph through already-built artifacts.
//!
//! Both SHA-1 and SHA-256 manifests can be produced from the same
//! tracker; gitoids are cached and shared between the two passes.
//!
//! [omnibor]: https://omnibor.io

pub(crate) mod util;

mod error;
mod make_rule;
mod manifest;
mod note_section;
mod storage;
mod tracker;

pub use crate::error::OmniborError;
pub use crate::manifest::Manifest;
pub use crate::manifest::ManifestEntry;
pub use crate::storage::FileSystemStore;
pub use crate::tracker::DependencyTracker;

pub use blobid::GitOid;
pub use blobid::HashAlgorithm;
pub use blobid::ObjectType;
