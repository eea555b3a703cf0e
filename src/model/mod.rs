//! Host type/symbol graph that the convention analyzer runs over.
//!
//! The graph is an arena: types and methods are addressed by `TypeId` and
//! `MethodId` handles, base types and overridden methods are parent
//! pointers, and constructed generics are interned. Model files (YAML or
//! JSON) stand in for the host compiler.

mod compilation;
mod expr;
mod loader;
mod types;

pub use compilation::{Compilation, VOID};
pub use expr::{parse_type_expr, TypeExpr};
pub use loader::{
    ArgDef, AttributeDef, CompilationBuilder, ConstDef, MethodDef, ModelError, ModelFile,
    ReturnDef, TypeDef,
};
pub use types::{
    AttributeArg, AttributeData, AttributeHit, AttributeOwner, AttributeRef, ConstValue,
    Location, MethodId, MethodSymbol, ReturnStatement, TypeId, TypeKind, TypeNode,
};
