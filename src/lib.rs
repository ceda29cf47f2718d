//! Hindley-Milner type inference for a small S-expression language, with a
//! value-restriction guard for mutable references and effects.
//!
//! The crate is organized leaf-first:
//!
//! - [`symbol`], [`sexpr`], [`ast`], [`syntax`]: names, the reader, the
//!   core AST, and the surface lowering that eliminates `do`/`if`/recursive
//!   `let`s before inference;
//! - [`ty`]: monotypes, polytypes, and the per-session constructor
//!   universe;
//! - [`union_find`]: the per-run equivalence store over monotypes;
//! - [`context`]: the frame-arena typing context;
//! - [`infer`]: unification, generalization, the dangerous-variable
//!   analysis, and Algorithm W itself;
//! - [`builtins`]: the seed context handed to a fresh session.
//!
//! A host drives it as: parse with [`sexpr::parse_forms`], lower with
//! [`syntax::Lowerer`], then call [`infer::hindley_milner`] with a fresh
//! [`union_find::UnionFind`] per top-level form.

pub mod ast;
pub mod builtins;
pub mod context;
pub mod infer;
pub mod sexpr;
pub mod symbol;
pub mod syntax;
pub mod ty;
pub mod union_find;
