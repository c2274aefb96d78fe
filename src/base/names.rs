//! Name spellings.
//!
//! Three spellings of a class name appear across the crate:
//!
//! - *binary* names, as users write them with `$` for nesting:
//!   `java.util.Map$Entry`
//! - *internal* names, as the class file stores them: `java/util/Map$Entry`
//! - *simple* names, as they appear unqualified in source: `Entry`

use smol_str::SmolStr;

/// `java.util.Map$Entry` -> `java/util/Map$Entry`
pub fn binary_to_internal(binary: &str) -> SmolStr {
    SmolStr::from(binary.replace('.', "/"))
}

/// `java/util/Map$Entry` -> `java.util.Map$Entry`
pub fn internal_to_binary(internal: &str) -> SmolStr {
    SmolStr::from(internal.replace('/', "."))
}

/// The simple name of a binary or internal class name.
///
/// Nested classes use the segment after the last `$`. Anonymous and local
/// classes keep their compiler-generated suffix (`1`, `1Local`).
pub fn simple_name_of(name: &str) -> &str {
    let after_pkg = name.rsplit(['.', '/']).next().unwrap_or(name);
    after_pkg.rsplit('$').next().unwrap_or(after_pkg)
}
