//! Symbol information reconstructed from compiled class files.
//!
//! - [`parse_class`] - Streaming parser, reports [`ClassEvent`]s
//! - [`StubBuilder`] - State machine turning events into a [`ClassStub`]
//! - [`classpath`] - Providers of class bytes
//! - [`StubCache`] - Run-scoped, lazily populated stub cache
//!
//! Class files are read, never loaded, verified or executed.

mod cache;
pub mod classpath;
mod constant_pool;
pub mod descriptor;
mod error;
mod event;
mod parser;
mod reader;
mod stub;
mod stub_builder;
mod value_builder;

pub use cache::{StubCache, StubEntry};
#[cfg(feature = "jar")]
pub use classpath::JarClasspath;
pub use classpath::{ClassBytes, ClassBytesProvider, CompositeClasspath, DirectoryClasspath, MemoryClasspath};
pub use error::{ClasspathError, StubError, StubResult};
pub use event::{ClassEvent, ClassVersion, ClassVisitor, EventLog};
pub use parser::parse_class;
pub use stub::{AnnotationUse, ClassStub, ExecutableStub, FieldStub, MemberTypeStub};
pub use stub_builder::{BuilderState, StubBuilder};
