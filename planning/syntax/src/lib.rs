//! Reading of PDDL files into a concrete syntax tree.
//!
//! The tree produced by [`read_domain_tree`] and [`read_problem_tree`] keeps every token of the
//! source together with its location, so that later stages can report errors on the original text.

pub mod cst;
pub mod errors;
pub mod find_file;
pub mod input;
pub mod reader;
pub mod sexpr;

pub use cst::{Node, Rule};
pub use errors::{Message, Res, Span, Spanned};
pub use find_file::find_domain_of;
pub use input::Input;
pub use reader::{read_domain_tree, read_problem_tree};
