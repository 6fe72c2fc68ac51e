//! Typed abstract syntax tree of PDDL domains and problems.
//!
//! The AST is built from the concrete syntax tree of [`pddl_syntax`] by the functions of [`translate`],
//! can be queried for the predicates that actions require, add or delete, and renders back to
//! canonical PDDL text through [`std::fmt::Display`].

mod actions;
pub mod errors;
mod expressions;
mod formula;
mod model;
mod params;
pub mod serialize;
pub mod translate;

pub use actions::*;
pub use expressions::*;
pub use formula::*;
pub use model::*;
pub use params::*;
pub use serialize::{AsPddl, Indent, PDDL_INDENT};

pub use errors::{Construct, TranslateError};
