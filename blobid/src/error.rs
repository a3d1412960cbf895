//! Error arising from `GitOid` construction or use.

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::result::Result as StdResult;
use std::error::Error as StdError;
use std::io::Error as IoError;

/// A `Result` with `blobid::Error` as the error type.
pub type Result<T> = StdResult<T, Error>;

/// An error arising during `GitOid` construction.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The amount of data read didn't match the length announced in the
    /// gitoid header, so the produced hash would be invalid.
    BadLength {
        /// The length announced in the header.
        expected: usize,
        /// The number of bytes actually read.
        actual: usize,
    },

    /// Could not perform the IO operations necessary to construct the
    /// `GitOid`.
    Io(Box<IoError>),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::BadLength { expected, actual } => {
                write!(
                    f,
                    "bad read length; expected '{}', got '{}'",
                    expected, actual
                )
            }
            Error::Io(source) => write!(f, "{}", source),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::BadLength { .. } => None,
            Error::Io(source) => Some(source),
        }
    }
}

impl From<IoError> for Error {
    fn from(source: IoError) -> Error {
        Error::Io(Box::new(source))
    }
}
