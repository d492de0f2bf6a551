//! TypeScript emission: a small syntax tree, its renderer and the fragment builders

pub mod ast;
pub mod emit;
pub mod fragments;

pub use ast::*;
pub use emit::{Emit, quote_if_needed};
pub use fragments::{
    ApiFragment, FragmentContext, HookFragment, QueryKeyFragment, VariablesType,
    reserved_identifiers,
};
