//! Errors raised while reading class bytes.

use std::path::PathBuf;

use smol_str::SmolStr;
use thiserror::Error;

/// Failure to obtain the bytes of a class from the classpath.
#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "jar")]
    #[error("cannot read archive entry {entry}: {source}")]
    Archive {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Failure to build the stub of one class.
///
/// Every variant except [`StubError::Consistency`] describes bad input.
/// `Consistency` means the extractor itself broke one of its invariants.
#[derive(Debug, Error)]
pub enum StubError {
    #[error("malformed class file at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    #[error("not a class file (magic {0:#010x})")]
    BadMagic(u32),

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("invalid descriptor `{0}`")]
    BadDescriptor(SmolStr),

    #[error("class file declares `{found}` but was requested as `{expected}`")]
    NameMismatch { expected: SmolStr, found: SmolStr },

    #[error("internal consistency violation: {0}")]
    Consistency(String),

    #[error(transparent)]
    Classpath(#[from] ClasspathError),
}

impl StubError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        StubError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn consistency(reason: impl Into<String>) -> Self {
        StubError::Consistency(reason.into())
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, StubError::Consistency(_))
    }
}

pub type StubResult<T> = Result<T, StubError>;
