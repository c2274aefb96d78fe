//! Shadow groups: persistent, layered name lookup for one namespace.
//!
//! A [`ShadowGroup`] is a chain of frames. Each frame is a [`NameResolver`]
//! answering "which declarations named `n` does this frame bind?". Lookups
//! walk the chain from the innermost frame outwards:
//!
//! - [`ShadowGroup::resolve_first`] stops at the first frame that binds the
//!   name. This is shadowing: a local variable hides a field of the same
//!   name, whatever their types.
//! - [`ShadowGroup::resolve_all`] visits every frame and yields every
//!   binding. This is overload accumulation for methods.
//!
//! Frames are never modified after they are linked. [`ShadowGroup::push`]
//! returns a new group and leaves the receiver untouched, so sibling scopes
//! (two `catch` clauses of one `try`) share their common parent chain.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smol_str::SmolStr;

use crate::base::FrameId;

// ============================================================================
// FRAMES
// ============================================================================

/// What a frame stands for. Recorded in every [`ResolveResult`] so that
/// consumers can tell an import hit from a local declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Root,
    /// `import p.*;`, including the implicit `java.lang.*`.
    OnDemandImport,
    /// `import static p.C.*;`
    StaticOnDemandImport,
    /// Other top-level types of the current package.
    SamePackage,
    /// `import p.C;`
    SingleTypeImport,
    /// `import static p.C.m;`
    SingleStaticImport,
    /// Top-level types declared in the current file.
    FileTypes,
    /// Members inherited from supertypes.
    Inherited,
    /// Members declared in a type body.
    Members,
    TypeParameters,
    /// Parameters of a method or lambda.
    Formals,
    /// Local variables and local classes.
    Locals,
}

impl FrameKind {
    pub fn is_import(self) -> bool {
        matches!(
            self,
            FrameKind::OnDemandImport
                | FrameKind::StaticOnDemandImport
                | FrameKind::SingleTypeImport
                | FrameKind::SingleStaticImport
        )
    }
}

/// One frame of a shadow group: the bindings of one set of declarations of
/// equal precedence.
pub trait NameResolver<T>: Send + Sync {
    /// Returns every binding of `name` in this frame, in declaration order.
    fn resolve_here(&self, name: &str) -> Cow<'_, [T]>
    where
        T: Clone;

    /// Whether the frame is known to bind nothing. Lazy frames return
    /// `false` unless they can tell without doing any work.
    fn is_definitely_empty(&self) -> bool {
        false
    }
}

/// An eager frame: a fixed map from simple name to bindings.
#[derive(Clone)]
pub struct SymbolMap<T> {
    map: IndexMap<SmolStr, Vec<T>, FxBuildHasher>,
}

impl<T> Default for SymbolMap<T> {
    fn default() -> Self {
        Self {
            map: IndexMap::default(),
        }
    }
}

impl<T> SymbolMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. Bindings of the same name accumulate in insertion
    /// order.
    pub fn insert(&mut self, name: impl Into<SmolStr>, value: T) {
        self.map.entry(name.into()).or_default().push(value);
    }

    pub fn len(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(SmolStr::as_str)
    }
}

impl<T> FromIterator<(SmolStr, T)> for SymbolMap<T> {
    fn from_iter<I: IntoIterator<Item = (SmolStr, T)>>(iter: I) -> Self {
        let mut map = SymbolMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<T: Clone + Send + Sync> NameResolver<T> for SymbolMap<T> {
    fn resolve_here(&self, name: &str) -> Cow<'_, [T]> {
        match self.map.get(name) {
            Some(bucket) => Cow::Borrowed(bucket.as_slice()),
            None => Cow::Borrowed(&[]),
        }
    }

    fn is_definitely_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<T> fmt::Debug for SymbolMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

// ============================================================================
// RESOLVE RESULT
// ============================================================================

/// A successful lookup together with the frame that produced it.
///
/// The core never interprets the provenance; it exists for diagnostics
/// such as unused imports.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolveResult<T> {
    result: T,
    frame: FrameId,
    kind: FrameKind,
    ambiguous: bool,
}

impl<T> ResolveResult<T> {
    pub fn result(&self) -> &T {
        &self.result
    }

    pub fn into_result(self) -> T {
        self.result
    }

    /// Identity of the frame that matched.
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    pub fn frame_kind(&self) -> FrameKind {
        self.kind
    }

    /// Whether the matching frame bound more than one declaration for the
    /// name (two on-demand imports providing the same simple name).
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResolveResult<U> {
        ResolveResult {
            result: f(self.result),
            frame: self.frame,
            kind: self.kind,
            ambiguous: self.ambiguous,
        }
    }
}

// ============================================================================
// SHADOW GROUP
// ============================================================================

struct Frame<T> {
    id: FrameId,
    kind: FrameKind,
    resolver: Arc<dyn NameResolver<T>>,
    parent: ShadowGroup<T>,
    depth: usize,
}

/// A persistent chain of frames for one namespace.
///
/// Cloning is an `Arc` clone.
pub struct ShadowGroup<T> {
    head: Option<Arc<Frame<T>>>,
}

impl<T> Clone for ShadowGroup<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<T> Default for ShadowGroup<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> ShadowGroup<T> {
    /// The root sentinel: binds nothing, has no parent.
    pub const fn empty() -> Self {
        Self { head: None }
    }

    pub fn is_root(&self) -> bool {
        self.head.is_none()
    }

    /// Number of frames, the root excluded.
    pub fn depth(&self) -> usize {
        self.head.as_ref().map_or(0, |f| f.depth)
    }

    /// Whether both groups are the same chain (not merely equal).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The next-outer group, `None` at the root.
    pub fn parent(&self) -> Option<&ShadowGroup<T>> {
        self.head.as_ref().map(|f| &f.parent)
    }

    /// Id of the innermost frame.
    pub fn frame_id(&self) -> FrameId {
        self.head.as_ref().map_or(FrameId::ROOT, |f| f.id)
    }

    /// Kind of the innermost frame.
    pub fn frame_kind(&self) -> FrameKind {
        self.head.as_ref().map_or(FrameKind::Root, |f| f.kind)
    }

    /// Frames from innermost to outermost, the root excluded.
    pub fn frames(&self) -> impl Iterator<Item = (FrameId, FrameKind)> + '_ {
        let mut current = self.head.as_deref();
        std::iter::from_fn(move || {
            let frame = current?;
            current = frame.parent.head.as_deref();
            Some((frame.id, frame.kind))
        })
    }
}

impl<T: Clone + Send + Sync + 'static> ShadowGroup<T> {
    /// A new group with `resolver` as its innermost frame.
    ///
    /// An empty resolver adds no frame: the receiver itself is returned, so
    /// scopes that declare nothing share their parent's chain.
    pub fn push(&self, kind: FrameKind, resolver: impl NameResolver<T> + 'static) -> Self {
        if resolver.is_definitely_empty() {
            return self.clone();
        }
        self.push_arc(kind, Arc::new(resolver))
    }

    /// Like [`push`](Self::push), for a resolver that is already shared.
    pub fn push_arc(&self, kind: FrameKind, resolver: Arc<dyn NameResolver<T>>) -> Self {
        if resolver.is_definitely_empty() {
            return self.clone();
        }
        Self {
            head: Some(Arc::new(Frame {
                id: FrameId::fresh(),
                kind,
                resolver,
                parent: self.clone(),
                depth: self.depth() + 1,
            })),
        }
    }

    /// Convenience for pushing an eager frame.
    pub fn with<I>(&self, kind: FrameKind, bindings: I) -> Self
    where
        I: IntoIterator<Item = (SmolStr, T)>,
    {
        self.push(kind, bindings.into_iter().collect::<SymbolMap<T>>())
    }

    /// The binding of `name` in the nearest frame that has one.
    ///
    /// If that frame binds several declarations, the first one is returned
    /// and the result is flagged ambiguous.
    pub fn resolve_first(&self, name: &str) -> Option<ResolveResult<T>> {
        let mut current = self.head.as_deref();
        while let Some(frame) = current {
            let found = frame.resolver.resolve_here(name);
            if let Some(first) = found.first() {
                return Some(ResolveResult {
                    result: first.clone(),
                    frame: frame.id,
                    kind: frame.kind,
                    ambiguous: found.len() > 1,
                });
            }
            current = frame.parent.head.as_deref();
        }
        None
    }

    /// Every binding of `name` in every frame, innermost frame first.
    pub fn resolve_all<'a>(&'a self, name: &'a str) -> ResolveAll<'a, T> {
        ResolveAll {
            name,
            next_frame: self.head.as_deref(),
            current: Cow::Borrowed(&[]),
            index: 0,
        }
    }
}

impl<T> fmt::Debug for ShadowGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.frames().map(|(_, kind)| kind)).finish()
    }
}

/// Lazy iterator returned by [`ShadowGroup::resolve_all`].
///
/// Frames are asked for bindings only when the iterator reaches them, so
/// stopping early skips the remaining (possibly lazy) frames. Cloning the
/// iterator restarts from the same position.
pub struct ResolveAll<'a, T: Clone> {
    name: &'a str,
    next_frame: Option<&'a Frame<T>>,
    current: Cow<'a, [T]>,
    index: usize,
}

impl<T: Clone> Clone for ResolveAll<'_, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            next_frame: self.next_frame,
            current: self.current.clone(),
            index: self.index,
        }
    }
}

impl<T: Clone> Iterator for ResolveAll<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(item) = self.current.get(self.index) {
                self.index += 1;
                return Some(item.clone());
            }
            let frame = self.next_frame?;
            self.current = frame.resolver.resolve_here(self.name);
            self.index = 0;
            self.next_frame = frame.parent.head.as_deref();
        }
    }
}
