//! Git Object Identifiers ("gitoids") for content-addressing artifacts.
//!
//! A gitoid is the identifier git itself assigns to file contents: the
//! hash of `"<object-type> " <decimal-length> "\0"` followed by the raw
//! bytes of the object. Because the identifier depends only on the bytes
//! being identified, anyone can reproduce it without a central authority,
//! which is what makes it usable as an artifact identity in dependency
//! manifests.
//!
//! This crate computes blob gitoids under SHA-1 and SHA-256 from byte
//! buffers, readers, and files. The bytes are hashed exactly as given;
//! there is no newline normalization or other canonicalization.

mod error;
mod gitoid;
mod hash_algorithm;
mod hash_ref;
mod object_type;

pub use crate::error::Error;
pub use crate::error::Result;
pub use crate::gitoid::GitOid;
pub use crate::hash_algorithm::HashAlgorithm;
pub use crate::hash_ref::HashRef;
pub use crate::object_type::ObjectType;

pub(crate) use crate::hash_algorithm::NUM_HASH_BYTES;
