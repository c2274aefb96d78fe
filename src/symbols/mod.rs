//! Symbol model.
//!
//! - [`symbol`] - Type, variable and method symbols, shared by source and
//!   class-file origins
//! - [`value`] - Compile-time constants ([`SymbolicValue`])

pub mod symbol;
pub mod value;

pub use symbol::{
    JElementSymbol, JMethodSymbol, JTypeSymbol, JVariableSymbol, MethodKind, MethodSym, Modifiers,
    SymbolOrigin, TypeKind, TypeSym, VariableKind, VariableSym,
};
pub use value::{ScalarValue, SymbolicAnnotation, SymbolicValue, TypeRef};
