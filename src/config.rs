//! Run configuration.

use smol_str::SmolStr;
use thiserror::Error;

/// Settings for one analysis run. Passed explicitly to
/// [`Analysis::new`](crate::Analysis::new); nothing is read from the
/// environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Packages every compilation unit imports on demand (dotted names).
    pub implicit_imports: Vec<SmolStr>,
    /// Whether type bodies see the members of their supertypes.
    pub load_inherited_members: bool,
    /// Panic on an internal consistency violation instead of reporting it.
    pub panic_on_internal_error: bool,
    /// Longest chain of supertypes walked when collecting inherited members.
    pub max_supertype_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            implicit_imports: vec![SmolStr::new_static("java.lang")],
            load_inherited_members: true,
            panic_on_internal_error: cfg!(debug_assertions),
            max_supertype_depth: 64,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_implicit_imports<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.implicit_imports = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_inherited_members(mut self, load: bool) -> Self {
        self.load_inherited_members = load;
        self
    }

    pub fn with_panic_on_internal_error(mut self, panic: bool) -> Self {
        self.panic_on_internal_error = panic;
        self
    }

    pub fn with_max_supertype_depth(mut self, depth: usize) -> Self {
        self.max_supertype_depth = depth;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_supertype_depth == 0 {
            return Err(ConfigError::ZeroSupertypeDepth);
        }
        for package in &self.implicit_imports {
            let valid = !package.is_empty()
                && package
                    .split('.')
                    .all(|seg| !seg.is_empty() && !seg.contains(['/', '*', ' ']));
            if !valid {
                return Err(ConfigError::InvalidPackage(package.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid implicit import package `{0}`")]
    InvalidPackage(SmolStr),

    #[error("max_supertype_depth must be at least 1")]
    ZeroSupertypeDepth,
}
