//! A gitoid representing a single artifact.

use crate::Error;
use crate::HashAlgorithm;
use crate::HashRef;
use crate::ObjectType;
use crate::Result;
use crate::NUM_HASH_BYTES;
use core::fmt;
use core::fmt::Display;
use core::fmt::Formatter;
use digest::DynDigest;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;

/// A git object identifier for a single artifact.
///
/// [Git object IDs][g] are computed over a short header naming the
/// object type and length, followed by the object bytes. The NUL that
/// terminates the header is part of the hashed stream.
///
/// [g]: https://git-scm.com/book/en/v2/Git-Internals-Git-Objects
#[derive(Clone, Copy, PartialOrd, Eq, Ord, Debug, Hash, PartialEq)]
pub struct GitOid {
    /// The hash algorithm being used.
    hash_algorithm: HashAlgorithm,

    /// The type of object being represented.
    object_type: ObjectType,

    /// The length of the hash in bytes.
    ///
    /// Invariant: this must always be less than or equal to `NUM_HASH_BYTES`.
    len: usize,

    /// The buffer storing the actual hashed bytes.
    value: [u8; NUM_HASH_BYTES],
}

impl GitOid {
    //===========================================================================================
    // Constructors
    //-------------------------------------------------------------------------------------------

    /// Create a new `GitOid` based on a slice of bytes.
    pub fn new_from_bytes(
        hash_algorithm: HashAlgorithm,
        object_type: ObjectType,
        content: &[u8],
    ) -> Self {
        let digester = hash_algorithm.create_digester();
        let reader = BufReader::new(content);
        let expected_length = content.len();

        // PANIC SAFETY: We're reading from an in-memory buffer, so no IO errors can arise.
        let (len, value) =
            hash_from_buffer(digester, reader, expected_length, object_type).unwrap();

        GitOid {
            hash_algorithm,
            object_type,
            len,
            value,
        }
    }

    /// Create a `GitOid` from a UTF-8 string slice.
    pub fn new_from_str(hash_algorithm: HashAlgorithm, object_type: ObjectType, s: &str) -> Self {
        GitOid::new_from_bytes(hash_algorithm, object_type, s.as_bytes())
    }

    /// Create a `GitOid` from a reader.
    ///
    /// The length that goes into the gitoid header is discovered by
    /// seeking to the end of the stream first; the stream is then hashed
    /// from its current position in buffered chunks.
    pub fn new_from_reader<R>(
        hash_algorithm: HashAlgorithm,
        object_type: ObjectType,
        mut reader: R,
    ) -> Result<Self>
    where
        R: Read + Seek,
    {
        let digester = hash_algorithm.create_digester();
        let expected_length = stream_len(&mut reader)? as usize;
        let buffered = BufReader::new(reader);
        let (len, value) = hash_from_buffer(digester, buffered, expected_length, object_type)?;

        Ok(GitOid {
            hash_algorithm,
            object_type,
            len,
            value,
        })
    }

    /// Create a `GitOid` from the contents of a file.
    pub fn new_from_file(
        hash_algorithm: HashAlgorithm,
        object_type: ObjectType,
        path: &Path,
    ) -> Result<Self> {
        let file = File::open(path)?;
        GitOid::new_from_reader(hash_algorithm, object_type, file)
    }

    //===========================================================================================
    // Getters
    //-------------------------------------------------------------------------------------------

    /// Get the hash data as a slice of bytes.
    pub fn hash(&self) -> HashRef<'_> {
        HashRef::new(&self.value[0..self.len])
    }

    /// Get the hash as a lowercase hexadecimal string.
    pub fn as_hex(&self) -> String {
        self.hash().as_hex()
    }

    /// Get the hash algorithm used for the `GitOid`.
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// Get the object type of the `GitOid`.
    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Get the length of the hash in bytes.
    pub fn hash_len(&self) -> usize {
        self.len
    }
}

impl Display for GitOid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gitoid:{}:{}:{}",
            self.object_type,
            self.hash_algorithm,
            self.hash()
        )
    }
}

/// Feed the gitoid header and the reader's contents to the digester.
///
/// Will return an `Err` if the reader errors, or if the number of bytes
/// read differs from `expected_length`. The latter matters because the
/// header includes the number of bytes being hashed; if the actual count
/// differs, the hash is not a valid gitoid.
fn hash_from_buffer<R>(
    mut digester: Box<dyn DynDigest>,
    mut reader: BufReader<R>,
    expected_length: usize,
    object_type: ObjectType,
) -> Result<(usize, [u8; NUM_HASH_BYTES])>
where
    BufReader<R>: Read,
{
    // The NUL is included in the hashed bytes.
    let prefix = format!("{} {}\0", object_type, expected_length);
    digester.update(prefix.as_bytes());

    let mut buf = [0; 4096];
    let mut amount_read: usize = 0;

    loop {
        match reader.read(&mut buf)? {
            0 => break,
            size => {
                digester.update(&buf[..size]);
                amount_read += size;
            }
        }
    }

    if amount_read != expected_length {
        return Err(Error::BadLength {
            expected: expected_length,
            actual: amount_read,
        });
    }

    let hash = digester.finalize();
    let len = hash.len().min(NUM_HASH_BYTES);

    let mut value = [0u8; NUM_HASH_BYTES];
    value[..len].copy_from_slice(&hash);
    Ok((len, value))
}

// What `Seek::stream_len` does, minus the nightly feature gate: tell at
// the end, then restore the original position.
fn stream_len<R>(mut stream: R) -> Result<u64>
where
    R: Seek,
{
    let old_pos = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;

    // Avoid seeking a third time when we were already at the end of the
    // stream. The branch is usually way cheaper than a seek operation.
    if old_pos != len {
        stream.seek(SeekFrom::Start(old_pos))?;
    }

    Ok(len)
}
