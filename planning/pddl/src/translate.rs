//! Translation of the concrete syntax tree of PDDL into the AST.
//!
//! Each entry point receives a node of a given grammar rule and fails with a [`TranslateError`]
//! on the first construct that it cannot represent. No partial result is ever returned.

mod durative;
mod goals;
mod numeric;
mod structure;

pub use durative::{
    translate_da_effect, translate_duration_constraint, translate_durative_action, translate_timed_condition,
};
pub use goals::{translate_effect, translate_goal_description, translate_predicate, translate_term};
pub use numeric::{translate_fhead, translate_numeric_expression};
pub use structure::{
    translate_action, translate_domain, translate_initial_element, translate_problem, translate_typed_name_list,
    translate_typed_variable_list,
};

use crate::errors::{Construct, Result, TranslateError};
use pddl_syntax::{Node, Rule};

/// Fails if the node was not produced by the given rule.
fn expect_rule(node: &Node, rule: Rule) -> Result<()> {
    if node.rule() == rule {
        Ok(())
    } else {
        Err(TranslateError::malformed_term(format!("a node of rule {rule}, got {}", node.rule()), node))
    }
}

/// First child of `node` with the given rule.
fn required(node: &Node, rule: Rule) -> Result<&Node> {
    node.first_of(rule)
        .ok_or_else(|| TranslateError::malformed_term(format!("a child of rule {rule}"), node))
}

/// Lower-cased keyword following the opening parenthesis, e.g. `and` in `(and ...)`.
fn keyword_of(node: &Node) -> Option<String> {
    node.child(1)
        .filter(|c| c.rule() == Rule::Token)
        .map(|c| c.text().to_ascii_lowercase())
}

/// Text of the name held by a `Predicate`, `FunctionSymbol` or `ActionSymbol` child of `node`.
fn symbol_of(node: &Node, rule: Rule) -> Result<String> {
    let symbol = required(node, rule)?;
    let name = required(symbol, Rule::Name)?;
    Ok(name.text().into_owned())
}

/// Returns true if the node has a single child of the given rule.
fn is_wrapper_of(node: &Node, rule: Rule) -> bool {
    node.children().len() == 1 && node.children()[0].rule() == rule
}

fn unsupported(construct: Construct, node: &Node) -> TranslateError {
    tracing::debug!(%construct, text = %node.text(), "rejected construct");
    TranslateError::unsupported(construct, node)
}
