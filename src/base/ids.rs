//! Identifiers for files, syntax nodes and source declarations.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// An identifier for an analyzed source file.
///
/// The path lives with whoever assigned the id; inside the core a file is
/// only ever compared and hashed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(pub u32);

impl FileId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// A file-local identifier for a syntax node (a scope or a declaration).
///
/// Assigned by the parser. The core only requires that ids are unique
/// within one file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A globally unique reference to a declaration in source.
///
/// This is the identity of every source-declared symbol.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct DefId {
    pub file: FileId,
    pub node: NodeId,
}

impl DefId {
    #[inline]
    pub const fn new(file: FileId, node: NodeId) -> Self {
        Self { file, node }
    }
}

impl fmt::Debug for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefId({:?}:{})", self.file, self.node.0)
    }
}

/// Process-unique identity of one shadow-group frame.
///
/// Frames are created from many threads at once, so ids come from a global
/// counter rather than from any per-file allocator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FrameId(u64);

static NEXT_FRAME: AtomicU64 = AtomicU64::new(1);

impl FrameId {
    /// The id of the root sentinel shared by every chain.
    pub const ROOT: FrameId = FrameId(0);

    pub(crate) fn fresh() -> Self {
        Self(NEXT_FRAME.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({})", self.0)
    }
}
