//! Grammar reader: turns the text of a PDDL domain or problem into a [`Node`] tree labelled with grammar rules.
//!
//! Reading happens in two steps: the text is first split into s-expressions, which are then
//! matched against the PDDL grammar. Keywords are matched case-insensitively while names keep
//! the case they have in the source.

mod domain;
mod formulas;
mod problem;

use crate::cst::{Node, Rule};
use crate::errors::*;
use crate::input::Input;
use crate::sexpr::*;
use std::sync::Arc;

pub use formulas::is_number;

/// Reads a domain file into a tree whose root has the rule [`Rule::Domain`].
pub fn read_domain_tree(input: Input) -> Res<Node> {
    let input = Arc::new(input);
    let expr = parse(input)?;
    domain::read_domain(&expr).map_err(|e| e.ctx("while reading a PDDL domain"))
}

/// Reads a problem file into a tree whose root has the rule [`Rule::Problem`].
pub fn read_problem_tree(input: Input) -> Res<Node> {
    let input = Arc::new(input);
    let expr = parse(input)?;
    problem::read_problem(&expr).map_err(|e| e.ctx("while reading a PDDL problem"))
}

/// Terminal node holding the text of the atom.
fn leaf(rule: Rule, atom: &SAtom) -> Node {
    Node::leaf(rule, atom.str()).with_span(atom.span().cloned())
}

/// Keyword token, as written in the source.
fn keyword(atom: &SAtom) -> Node {
    leaf(Rule::Token, atom)
}

/// Keyword token that has no counterpart in the source.
fn implicit(keyword: &str) -> Node {
    Node::token(keyword)
}

/// Node for a parenthesized list: the children are surrounded by the tokens of the list delimiters.
fn parenthesized(rule: Rule, list: &SList, inner: Vec<Node>) -> Node {
    let span = list.loc();
    let mut children = Vec::with_capacity(inner.len() + 2);
    children.push(Node::token("(").with_span(Some(span.start())));
    children.extend(inner);
    children.push(Node::token(")").with_span(Some(span.end())));
    Node::new(rule, children).with_span(Some(span))
}

/// Node whose only child is `child`, spanning the same text.
fn wrap(rule: Rule, child: Node) -> Node {
    let span = child.span().cloned();
    Node::new(rule, vec![child]).with_span(span)
}

/// Node over a sequence of siblings. It spans from the first to the last child.
fn group(rule: Rule, children: Vec<Node>) -> Node {
    let first = children.iter().find_map(|c| c.span());
    let last = children.iter().rev().find_map(|c| c.span());
    let span = match (first, last) {
        (Some(first), Some(last)) => Some(first.merge(last)),
        _ => None,
    };
    Node::new(rule, children).with_span(span)
}

/// Uninterpreted copy of an expression.
fn raw(e: &SExpr) -> Node {
    match e {
        SExpr::Atom(a) => keyword(a),
        SExpr::List(l) => parenthesized(Rule::Raw, l, l.iter().map(raw).collect()),
    }
}

fn as_list(e: &SExpr) -> Res<&SList> {
    e.as_list().ok_or_else(|| e.invalid("Expected a list"))
}

/// Raises an error if some elements of the list were not consumed.
fn expect_end(items: &ListIter) -> Res<()> {
    match items.peek() {
        Some(e) => Err(e.invalid("Unexpected element")),
        None => Ok(()),
    }
}

/// Stores the node of a section that may appear at most once.
fn set_once(slot: &mut Option<Node>, node: Node, block: &SExpr) -> Res<()> {
    if slot.is_some() {
        return Err(block.invalid("Duplicated section"));
    }
    *slot = Some(node);
    Ok(())
}
