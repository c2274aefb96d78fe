//! Stub cache behaviour across files and threads
//!
//! Every request for a class yields the same stub, bad class files only
//! affect names that depend on them, and directory classpaths read the
//! usual `pkg/Name.class` layout.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use common::classgen::{ACC_PUBLIC, ClassGen, Member};
use jsym::ast::{CompilationUnit, ImportDecl, ScopeKind, ScopeNode};
use jsym::base::{FileId, NodeId, TextRange, TextSize};
use jsym::bytecode::{
    ClassBytes, ClassBytesProvider, ClasspathError, CompositeClasspath, DirectoryClasspath, MemoryClasspath, StubEntry,
    StubError,
};
use jsym::diagnostics::codes;
use jsym::{Analysis, AnalysisConfig, FrameKind};

fn importing(file: u32, imports: &[&str]) -> CompilationUnit {
    let root = ScopeNode::new(
        NodeId::new(0),
        ScopeKind::CompilationUnit,
        TextRange::new(TextSize::from(0), TextSize::from(10)),
    );
    imports
        .iter()
        .enumerate()
        .fold(CompilationUnit::new(FileId::new(file), root), |unit, (i, name)| {
            unit.with_import(ImportDecl::single(NodeId::new(i as u32 + 1), *name))
        })
}

/// Counts reads of class bytes.
struct Counting {
    inner: MemoryClasspath,
    reads: AtomicUsize,
}

impl ClassBytesProvider for Counting {
    fn class_bytes(&self, internal_name: &str) -> Result<Option<ClassBytes>, ClasspathError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.class_bytes(internal_name)
    }
}

#[test]
fn test_concurrent_requests_agree() {
    common::init_tracing();
    let classpath = MemoryClasspath::new().with(
        "p/Shared",
        ClassGen::class("p/Shared")
            .method(Member::new(ACC_PUBLIC, "m", "()V"))
            .bytes(),
    );
    let analysis = Analysis::new(AnalysisConfig::default(), Arc::new(classpath)).unwrap();
    let stubs = analysis.stubs();

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(move || stubs.get("p/Shared").unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(results.iter().all(|stub| Arc::ptr_eq(stub, &results[0])));
    assert!(Arc::ptr_eq(
        results[0].methods[0].symbol(),
        stubs.get("p/Shared").unwrap().methods[0].symbol()
    ));
}

#[test]
fn test_files_in_parallel_share_stubs() {
    let classpath = MemoryClasspath::new().with("p/Shared", ClassGen::class("p/Shared").bytes());
    let analysis = Analysis::new(AnalysisConfig::default(), Arc::new(classpath)).unwrap();
    let units: Vec<_> = (0..32).map(|i| importing(i, &["p.Shared"])).collect();

    let tables = analysis.analyze_files(&units);
    assert_eq!(tables.len(), 32);
    let symbols: Vec<_> = tables
        .iter()
        .map(|t| t.root().resolve_type_name("Shared").unwrap().into_result())
        .collect();
    assert!(symbols.iter().all(|s| Arc::ptr_eq(s, &symbols[0])));
    assert_eq!(tables[7].file(), FileId::new(7));
}

#[test]
fn test_lookups_are_cached() {
    let provider = Arc::new(Counting {
        inner: MemoryClasspath::new().with("p/A", ClassGen::class("p/A").bytes()),
        reads: AtomicUsize::new(0),
    });
    let analysis = Analysis::new(AnalysisConfig::default(), provider.clone()).unwrap();

    assert!(analysis.stubs().get("p/A").is_some());
    assert!(analysis.stubs().get("p/Missing").is_none());
    let reads = provider.reads.load(Ordering::SeqCst);
    assert!(analysis.stubs().get("p/A").is_some());
    assert!(analysis.stubs().get("p/Missing").is_none());
    assert_eq!(provider.reads.load(Ordering::SeqCst), reads);
}

#[test]
fn test_malformed_class_is_isolated() {
    common::init_tracing();
    let classpath = MemoryClasspath::new()
        .with("p/Good", ClassGen::class("p/Good").bytes())
        .with("p/Bad", vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52, 0])
        .with("p/Old", ClassGen::class("p/Old").major(44).bytes())
        .with("p/Wrong", ClassGen::class("p/Other").bytes());
    let analysis = Analysis::new(AnalysisConfig::default(), Arc::new(classpath)).unwrap();
    let units = vec![
        importing(0, &["p.Good", "p.Bad", "p.Old", "p.Wrong"]),
        importing(1, &["p.Bad"]),
    ];
    let tables = analysis.analyze_files(&units);

    let root = tables[0].root();
    assert!(!root.resolve_type_name("Good").unwrap().result().is_unresolved());
    let bad = root.resolve_type_name("Bad").unwrap();
    assert_eq!(bad.frame_kind(), FrameKind::SingleTypeImport);
    assert!(bad.result().is_unresolved());

    let diags = analysis.diagnostics();
    let code_of = |subject: &str, code: &str| {
        diags
            .for_subject(subject)
            .iter()
            .filter(|d| d.code.as_deref() == Some(code))
            .count()
    };
    // once per name, even though two files import it
    assert_eq!(code_of("p.Bad", codes::MALFORMED_CLASS), 1);
    assert_eq!(code_of("p.Bad", codes::UNRESOLVED_IMPORT), 1);
    assert_eq!(code_of("p.Old", codes::UNSUPPORTED_CLASS_VERSION), 1);
    assert_eq!(code_of("p.Wrong", codes::CLASS_NAME_MISMATCH), 1);
    assert!(diags.for_subject("p.Good").is_empty());

    let failed: Vec<_> = analysis.stubs().failures().into_iter().map(|(name, _)| name).collect();
    assert_eq!(failed, vec!["p/Bad", "p/Old", "p/Wrong"]);
    let StubEntry::Failed(err) = analysis.stubs().entry("p/Old") else {
        panic!("expected a failed entry");
    };
    assert!(matches!(*err, StubError::UnsupportedVersion { major: 44, .. }));
}

#[test]
fn test_directory_classpath() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("p")).unwrap();
    std::fs::write(dir.path().join("p/OnDisk.class"), ClassGen::class("p/OnDisk").bytes()).unwrap();

    let classpath = CompositeClasspath::new()
        .with(MemoryClasspath::new().with("p/InMemory", ClassGen::class("p/InMemory").bytes()))
        .with(DirectoryClasspath::new(dir.path()));
    let analysis = Analysis::new(AnalysisConfig::default(), Arc::new(classpath)).unwrap();

    assert_eq!(analysis.stubs().get("p/OnDisk").unwrap().binary_name, "p.OnDisk");
    assert!(analysis.stubs().get("p/InMemory").is_some());
    assert!(analysis.stubs().get("p/Absent").is_none());
    assert!(analysis.diagnostics().is_empty());
}

#[cfg(feature = "jar")]
#[test]
fn test_jar_classpath() {
    use std::io::Write;

    use jsym::bytecode::JarClasspath;
    use zip::write::SimpleFileOptions;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.jar");
    let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    writer.start_file("p/InJar.class", options).unwrap();
    writer.write_all(&ClassGen::class("p/InJar").bytes()).unwrap();
    writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
    writer.write_all(b"Manifest-Version: 1.0\n").unwrap();
    writer.finish().unwrap();

    let jar = JarClasspath::open(&path).unwrap();
    assert!(jar.class_bytes("p/InJar").unwrap().is_some());
    assert!(jar.class_bytes("p/NotInJar").unwrap().is_none());

    let analysis = Analysis::new(AnalysisConfig::default(), Arc::new(jar)).unwrap();
    assert_eq!(analysis.stubs().get("p/InJar").unwrap().binary_name, "p.InJar");
    assert!(analysis.stubs().get("p/NotInJar").is_none());
    assert!(analysis.diagnostics().is_empty());
}
