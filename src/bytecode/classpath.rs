//! Where class bytes come from.
//!
//! A [`ClassBytesProvider`] maps an internal name (`java/util/Map$Entry`) to
//! the bytes of its class file. Absence is `Ok(None)`; only genuine read
//! failures are errors.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smol_str::SmolStr;

use super::error::ClasspathError;

pub type ClassBytes = Arc<[u8]>;

pub trait ClassBytesProvider: Send + Sync {
    fn class_bytes(&self, internal_name: &str) -> Result<Option<ClassBytes>, ClasspathError>;
}

impl<P: ClassBytesProvider + ?Sized> ClassBytesProvider for Arc<P> {
    fn class_bytes(&self, internal_name: &str) -> Result<Option<ClassBytes>, ClasspathError> {
        (**self).class_bytes(internal_name)
    }
}

// ============================================================================
// IN MEMORY
// ============================================================================

/// Class files held in memory, keyed by internal name.
#[derive(Clone, Debug, Default)]
pub struct MemoryClasspath {
    classes: IndexMap<SmolStr, ClassBytes, FxBuildHasher>,
}

impl MemoryClasspath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, internal_name: impl Into<SmolStr>, bytes: impl Into<ClassBytes>) {
        self.classes.insert(internal_name.into(), bytes.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, internal_name: impl Into<SmolStr>, bytes: impl Into<ClassBytes>) -> Self {
        self.insert(internal_name, bytes);
        self
    }

    pub fn remove(&mut self, internal_name: &str) -> Option<ClassBytes> {
        self.classes.shift_remove(internal_name)
    }

    pub fn contains(&self, internal_name: &str) -> bool {
        self.classes.contains_key(internal_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.keys().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassBytesProvider for MemoryClasspath {
    fn class_bytes(&self, internal_name: &str) -> Result<Option<ClassBytes>, ClasspathError> {
        Ok(self.classes.get(internal_name).cloned())
    }
}

// ============================================================================
// DIRECTORY
// ============================================================================

/// A directory laid out like `javac -d` output: `a/b/C.class`.
#[derive(Clone, Debug)]
pub struct DirectoryClasspath {
    root: PathBuf,
}

impl DirectoryClasspath {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the class file for `internal_name`, or `None` if the name
    /// could escape the root.
    fn path_of(&self, internal_name: &str) -> Option<PathBuf> {
        if internal_name.is_empty()
            || internal_name.starts_with('/')
            || internal_name.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
            || internal_name.contains('\\')
        {
            return None;
        }
        Some(self.root.join(format!("{internal_name}.class")))
    }
}

impl ClassBytesProvider for DirectoryClasspath {
    fn class_bytes(&self, internal_name: &str) -> Result<Option<ClassBytes>, ClasspathError> {
        let Some(path) = self.path_of(internal_name) else {
            return Ok(None);
        };
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes.into())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ClasspathError::Io { path, source }),
        }
    }
}

// ============================================================================
// ARCHIVE
// ============================================================================

#[cfg(feature = "jar")]
pub use jar::JarClasspath;

#[cfg(feature = "jar")]
mod jar {
    use std::fs::File;
    use std::io::Read;
    use std::path::Path;

    use parking_lot::Mutex;
    use zip::ZipArchive;
    use zip::result::ZipError;

    use super::{ClassBytes, ClassBytesProvider};
    use crate::bytecode::error::ClasspathError;

    /// A `.jar` (or any zip) archive.
    pub struct JarClasspath {
        archive: Mutex<ZipArchive<File>>,
    }

    impl JarClasspath {
        pub fn open(path: impl AsRef<Path>) -> Result<Self, ClasspathError> {
            let path = path.as_ref();
            let file = File::open(path).map_err(|source| ClasspathError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let archive = ZipArchive::new(file).map_err(|source| ClasspathError::Archive {
                entry: path.display().to_string(),
                source,
            })?;
            Ok(Self {
                archive: Mutex::new(archive),
            })
        }
    }

    impl ClassBytesProvider for JarClasspath {
        fn class_bytes(&self, internal_name: &str) -> Result<Option<ClassBytes>, ClasspathError> {
            let entry = format!("{internal_name}.class");
            let mut archive = self.archive.lock();
            let mut file = match archive.by_name(&entry) {
                Ok(file) => file,
                Err(ZipError::FileNotFound) => return Ok(None),
                Err(source) => return Err(ClasspathError::Archive { entry, source }),
            };
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes).map_err(|e| ClasspathError::Archive {
                entry: entry.clone(),
                source: ZipError::Io(e),
            })?;
            Ok(Some(bytes.into()))
        }
    }
}

// ============================================================================
// COMPOSITE
// ============================================================================

/// Several providers searched in order; the first hit wins.
#[derive(Default)]
pub struct CompositeClasspath {
    entries: Vec<Arc<dyn ClassBytesProvider>>,
}

impl CompositeClasspath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, provider: Arc<dyn ClassBytesProvider>) {
        self.entries.push(provider);
    }

    pub fn with(mut self, provider: impl ClassBytesProvider + 'static) -> Self {
        self.entries.push(Arc::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClassBytesProvider for CompositeClasspath {
    fn class_bytes(&self, internal_name: &str) -> Result<Option<ClassBytes>, ClasspathError> {
        for entry in &self.entries {
            if let Some(bytes) = entry.class_bytes(internal_name)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}
